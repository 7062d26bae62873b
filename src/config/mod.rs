//! Configuration module for icon-scraper
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, as well as reading plain-text domain lists.
//!
//! # Example
//!
//! ```no_run
//! use icon_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("icons.toml")).unwrap();
//! println!("At most {} requests in flight", config.max_concurrent_requests);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, ReportSink, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_config, load_domain_list, parse_config, parse_domain_list};
pub use validation::validate;
