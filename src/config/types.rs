use crate::ScrapeError;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;

/// Destination for errors or warnings produced while scraping
///
/// Sinks are unbounded so that reporting never blocks a probe. A sink that is
/// never drained only grows in memory.
pub type ReportSink = UnboundedSender<ScrapeError>;

/// Default browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.6.1 Safari/605.1.15";

/// Main configuration structure for one scraping call
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Only consider icons whose width equals their height
    #[serde(rename = "square-only", default)]
    pub square_only: bool,

    /// Preferred icon height in pixels
    #[serde(rename = "target-height", default = "default_target_height")]
    pub target_height: u32,

    /// Prefer an SVG icon over any bitmap when one is found
    #[serde(rename = "allow-svg", default)]
    pub allow_svg: bool,

    /// Maximum number of requests in flight at once, across all domains
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Error sink; a logging sink is created per call when unset
    #[serde(skip)]
    pub errors: Option<ReportSink>,

    /// Warning sink; a logging sink is created per call when unset
    #[serde(skip)]
    pub warnings: Option<ReportSink>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Attempts per request before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the linear backoff between attempts (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Timeout for a single attempt (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on candidate probes spawned for one domain
    #[serde(
        rename = "max-candidates-per-domain",
        default = "default_max_candidates_per_domain"
    )]
    pub max_candidates_per_domain: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            square_only: false,
            target_height: default_target_height(),
            allow_svg: false,
            max_concurrent_requests: default_max_concurrent_requests(),
            http: HttpConfig::default(),
            errors: None,
            warnings: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_candidates_per_domain: default_max_candidates_per_domain(),
        }
    }
}

fn default_target_height() -> u32 {
    128
}

fn default_max_concurrent_requests() -> u32 {
    20
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_attempts() -> u32 {
    6
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_candidates_per_domain() -> usize {
    64
}
