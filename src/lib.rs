//! icon-scraper: finds the best icon for a set of domains
//!
//! For every domain the crate fetches the home page, discovers candidate icon
//! URLs from the document head, an optional web app manifest and the
//! well-known `/favicon.ico`, probes every candidate concurrently and picks
//! the one that best matches the caller's size and shape preferences.

pub mod config;
pub mod crawler;
pub mod icon;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for icon scraping operations
///
/// Most variants never reach the caller as an `Err`: they are reported on the
/// error or warning sink of the call and the affected domain or candidate is
/// skipped.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid domain '{domain}': {source}")]
    InvalidDomain { domain: String, source: UrlError },

    #[error("Failed to get {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to get {url}: http {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Failed to parse manifest {url}: {source}")]
    ManifestParse {
        url: String,
        source: serde_json::Error,
    },

    #[error("Failed to decode image {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Candidate limit of {limit} reached for {domain}, skipping {url}")]
    CandidateLimit {
        domain: String,
        limit: usize,
        url: String,
    },

    #[error("Request dispatcher is closed, cannot get {url}")]
    DispatcherClosed { url: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::DomainStage,
        to: state::DomainStage,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL and domain errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("domain is empty")]
    EmptyDomain,

    #[error("domain is {0} characters long, the limit is 512")]
    DomainTooLong(usize),

    #[error("{0}")]
    Malformed(String),

    #[error("unsupported reference: {0}")]
    Unsupported(String),
}

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, HttpConfig, ReportSink};
pub use crawler::{get_icon, get_icons, get_icons_with_transport, IconMap};
pub use icon::Icon;
pub use state::DomainStage;
