//! HTTP transport implementation
//!
//! This module performs single GET attempts on behalf of the dispatcher:
//! - Building the HTTP client with a browser User-Agent
//! - Following redirects and reporting the final URL
//! - Classifying transport failures into readable messages
//!
//! Retries and the concurrency ceiling live in the dispatcher, not here.

use crate::config::HttpConfig;
use crate::ScrapeError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Response to one GET request
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL that actually served the response, after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: Bytes,
}

impl FetchResponse {
    /// Returns true for HTTP 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Returns true if the status is worth retrying
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// A single-attempt GET transport
///
/// An `Err` means the request never produced a readable response (DNS,
/// connect, TLS, timeout, body read). Any HTTP status is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ScrapeError>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed transparently and proxy settings are read from the
/// environment (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`).
///
/// # Example
///
/// ```no_run
/// use icon_scraper::config::HttpConfig;
/// use icon_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;

        Ok(FetchResponse {
            final_url,
            status,
            body,
        })
    }
}

/// Classifies a reqwest failure into a transport error
fn transport_error(url: &str, error: &reqwest::Error) -> ScrapeError {
    let message = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_body() || error.is_decode() {
        format!("failed to read response body: {}", error)
    } else {
        error.to_string()
    };

    ScrapeError::Transport {
        url: url.to_string(),
        message,
    }
}
