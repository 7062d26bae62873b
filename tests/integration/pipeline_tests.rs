//! Integration tests for the icon pipeline
//!
//! Most tests drive `get_icons_with_transport` over an in-memory transport so
//! that real domain names can be used. The last tests go through wiremock to
//! exercise the reqwest transport and the dispatcher's retries.

use async_trait::async_trait;
use bytes::Bytes;
use icon_scraper::crawler::{
    Dispatcher, FetchResponse, ReqwestTransport, RetryPolicy, Transport,
};
use icon_scraper::{get_icons_with_transport, Config, HttpConfig, ScrapeError};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A canned response for one URL
struct Page {
    status: u16,
    body: Vec<u8>,
    final_url: Option<String>,
}

/// Serves canned responses; unknown URLs get a 404
#[derive(Default)]
struct StaticTransport {
    pages: HashMap<String, Page>,
    requested: Mutex<Vec<String>>,
}

impl StaticTransport {
    fn page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(
            url.to_string(),
            Page {
                status: 200,
                body: body.into(),
                final_url: None,
            },
        );
        self
    }

    fn redirect(mut self, url: &str, final_url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(
            url.to_string(),
            Page {
                status: 200,
                body: body.into(),
                final_url: Some(final_url.to_string()),
            },
        );
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ScrapeError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(match self.pages.get(url) {
            Some(page) => FetchResponse {
                final_url: page.final_url.clone().unwrap_or_else(|| url.to_string()),
                status: page.status,
                body: Bytes::from(page.body.clone()),
            },
            None => FetchResponse {
                final_url: url.to_string(),
                status: 404,
                body: Bytes::from_static(b"not found"),
            },
        })
    }
}

/// Fails the first attempts at one URL with a transport error
struct FlakyTransport {
    inner: StaticTransport,
    url: String,
    failures_left: Mutex<u32>,
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ScrapeError> {
        if url == self.url {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(ScrapeError::Transport {
                    url: url.to_string(),
                    message: "connection reset".to_string(),
                });
            }
        }
        self.inner.fetch(url).await
    }
}

fn encode(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageOutputFormat::Png)
}

fn ico(size: u32) -> Vec<u8> {
    encode(size, size, ImageOutputFormat::Ico)
}

fn head(links: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Test</title>{}</head><body><img src=\"/body.png\"></body></html>",
        links
    )
}

/// Test config with captured sinks
struct Harness {
    config: Config,
    errors: mpsc::UnboundedReceiver<ScrapeError>,
    warnings: mpsc::UnboundedReceiver<ScrapeError>,
}

impl Harness {
    fn new() -> Self {
        let (errors_tx, errors) = mpsc::unbounded_channel();
        let (warnings_tx, warnings) = mpsc::unbounded_channel();
        let mut config = Config {
            errors: Some(errors_tx),
            warnings: Some(warnings_tx),
            ..Config::default()
        };
        config.http.max_attempts = 1;

        Self {
            config,
            errors,
            warnings,
        }
    }

    fn drain_errors(&mut self) -> Vec<ScrapeError> {
        let mut out = Vec::new();
        while let Ok(e) = self.errors.try_recv() {
            out.push(e);
        }
        out
    }

    fn drain_warnings(&mut self) -> Vec<ScrapeError> {
        let mut out = Vec::new();
        while let Ok(e) = self.warnings.try_recv() {
            out.push(e);
        }
        out
    }
}

#[tokio::test]
async fn test_selects_smallest_icon_above_target() {
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(
                r#"<link rel="icon" href="/icon-400.png">
                   <link rel="apple-touch-icon" href="https://cdn.example.com/touch-600.png">
                   <link rel="shortcut icon" href="icon-128.png">
                   <link rel="stylesheet" href="/site.css">"#,
            ),
        )
        .page("https://example.com/icon-400.png", png(400, 400))
        .page("https://cdn.example.com/touch-600.png", png(600, 600))
        .page("https://example.com/icon-128.png", png(128, 128))
        .page("https://example.com/favicon.ico", ico(32));
    let transport = Arc::new(transport);

    let mut harness = Harness::new();
    harness.config.target_height = 150;

    let icons = get_icons_with_transport(&harness.config, transport.clone(), ["example.com"])
        .await
        .unwrap();

    let icon = &icons["example.com"];
    assert_eq!(icon.url, "https://example.com/icon-400.png");
    assert_eq!(icon.mime, "image/png");
    assert_eq!((icon.width, icon.height), (Some(400), Some(400)));
    assert_eq!(icon.source, Bytes::from(png(400, 400)));

    let requested = transport.requested();
    assert!(requested.contains(&"https://example.com/favicon.ico".to_string()));
    assert!(!requested.contains(&"https://example.com/site.css".to_string()));
    assert!(!requested.contains(&"https://example.com/body.png".to_string()));
    assert!(harness.drain_errors().is_empty());
}

#[tokio::test]
async fn test_falls_back_to_largest_icon() {
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(r#"<link rel="icon" href="/icon-90.png">"#),
        )
        .page("https://example.com/icon-90.png", png(90, 90))
        .page("https://example.com/favicon.ico", ico(16));

    let harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();

    assert_eq!(icons["example.com"].url, "https://example.com/icon-90.png");
}

#[tokio::test]
async fn test_manifest_icons_are_candidates() {
    let manifest = r#"{
        "name": "Example",
        "icons": [
            { "src": "/android-192.png", "sizes": "192x192", "type": "image/png" },
            { "src": "android-512.png", "sizes": "512x512", "type": "image/png" }
        ]
    }"#;
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(r#"<link rel="manifest" href="/site.webmanifest">"#),
        )
        .page("https://example.com/site.webmanifest", manifest)
        .page("https://example.com/android-192.png", png(192, 192))
        .page("https://example.com/android-512.png", png(512, 512));

    let mut harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();

    assert_eq!(icons["example.com"].url, "https://example.com/android-192.png");
    // The missing favicon.ico is only a warning
    assert!(harness.drain_errors().is_empty());
    assert!(harness
        .drain_warnings()
        .iter()
        .any(|w| matches!(w, ScrapeError::HttpStatus { status: 404, .. })));
}

#[tokio::test]
async fn test_malformed_manifest_is_error() {
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(r#"<link rel="manifest" href="/manifest.json">"#),
        )
        .page("https://example.com/manifest.json", "{ not json")
        .page("https://example.com/favicon.ico", ico(48));

    let mut harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();

    assert_eq!(icons["example.com"].url, "https://example.com/favicon.ico");
    assert_eq!(icons["example.com"].mime, "image/x-icon");
    assert!(harness
        .drain_errors()
        .iter()
        .any(|e| matches!(e, ScrapeError::ManifestParse { .. })));
}

#[tokio::test]
async fn test_relative_references_use_redirected_host() {
    let transport = StaticTransport::default()
        .redirect(
            "https://example.com",
            "https://www.example.org/home",
            head(r#"<link rel="icon" href="/brand.png">"#),
        )
        .page("https://www.example.org/brand.png", png(64, 64));
    let transport = Arc::new(transport);

    let harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, transport.clone(), ["example.com"])
        .await
        .unwrap();

    // Keyed by the domain as requested
    assert_eq!(icons["example.com"].url, "https://www.example.org/brand.png");
    let requested = transport.requested();
    assert!(requested.contains(&"https://www.example.org/favicon.ico".to_string()));
    assert!(!requested.contains(&"https://example.com/brand.png".to_string()));
}

#[tokio::test]
async fn test_invalid_domain_is_skipped() {
    let transport = StaticTransport::default()
        .page("https://example.com", head(""))
        .page("https://example.com/favicon.ico", ico(32));
    let transport = Arc::new(transport);

    let mut harness = Harness::new();
    let icons = get_icons_with_transport(
        &harness.config,
        transport.clone(),
        ["example.com", "bad domain!", ""],
    )
    .await
    .unwrap();

    assert_eq!(icons.len(), 1);
    assert!(icons.contains_key("example.com"));
    let invalid = harness
        .drain_warnings()
        .into_iter()
        .filter(|w| matches!(w, ScrapeError::InvalidDomain { .. }))
        .count();
    assert_eq!(invalid, 2);
    assert!(transport
        .requested()
        .iter()
        .all(|url| url.starts_with("https://example.com")));
}

#[tokio::test]
async fn test_domain_without_icons_is_absent() {
    let transport = StaticTransport::default().page(
        "https://example.com",
        head(r#"<link rel="icon" href="/not-an-icon.png">"#),
    );
    let transport = transport.page("https://example.com/not-an-icon.png", "<html>oops</html>");

    let mut harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();

    assert!(icons.is_empty());
    // An HTML body behind an icon URL is not reported
    assert!(harness.drain_errors().is_empty());
}

#[tokio::test]
async fn test_square_only() {
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(
                r#"<link rel="icon" href="/wide.png">
                   <link rel="icon" href="/square.png">"#,
            ),
        )
        .page("https://example.com/wide.png", png(300, 200))
        .page("https://example.com/square.png", png(64, 64));

    let mut harness = Harness::new();
    harness.config.square_only = true;

    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();
    assert_eq!(icons["example.com"].url, "https://example.com/square.png");
}

#[tokio::test]
async fn test_svg_preference() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"></svg>"#;
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(
                r#"<link rel="icon" type="image/svg+xml" href="/logo.svg?v=2">
                   <link rel="icon" href="/icon-256.png">"#,
            ),
        )
        .page("https://example.com/logo.svg?v=2", svg)
        .page("https://example.com/icon-256.png", png(256, 256));
    let transport = Arc::new(transport);

    let mut harness = Harness::new();
    harness.config.allow_svg = true;
    let icons = get_icons_with_transport(&harness.config, transport.clone(), ["example.com"])
        .await
        .unwrap();
    let icon = &icons["example.com"];
    assert_eq!(icon.url, "https://example.com/logo.svg?v=2");
    assert_eq!(icon.mime, "image/svg+xml");
    assert_eq!(icon.height, None);

    harness.config.allow_svg = false;
    let icons = get_icons_with_transport(&harness.config, transport, ["example.com"])
        .await
        .unwrap();
    assert_eq!(icons["example.com"].url, "https://example.com/icon-256.png");
}

#[tokio::test]
async fn test_many_domains() {
    let domains: Vec<String> = (0..12).map(|i| format!("site{}.example", i)).collect();
    let mut transport = StaticTransport::default();
    for (i, domain) in domains.iter().enumerate() {
        transport = transport
            .page(&format!("https://{}", domain), head(""))
            .page(
                &format!("https://{}/favicon.ico", domain),
                ico(16 + i as u32),
            );
    }

    let mut harness = Harness::new();
    harness.config.max_concurrent_requests = 3;
    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), domains.clone())
        .await
        .unwrap();

    assert_eq!(icons.len(), domains.len());
    assert_eq!(icons["site5.example"].height, Some(21));
    assert!(harness.drain_errors().is_empty());
}

#[tokio::test]
async fn test_reqwest_transport_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(ico(32)))
        .mount(&mock_server)
        .await;

    let transport = Arc::new(ReqwestTransport::new(&HttpConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(
        transport,
        2,
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        },
    );

    let url = format!("{}/favicon.ico", mock_server.uri());
    let response = dispatcher.get(&url).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, Bytes::from(ico(32)));

    dispatcher.close().await;
}

#[tokio::test]
async fn test_reqwest_transport_gives_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let transport = Arc::new(ReqwestTransport::new(&HttpConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(
        transport,
        1,
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(5),
        },
    );

    let response = dispatcher
        .get(&format!("{}/broken", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status, 500);

    dispatcher.close().await;
}

#[tokio::test]
async fn test_binary_root_is_parse_error() {
    let transport = StaticTransport::default()
        .page("https://example.com", png(16, 16))
        .page("https://example.com/favicon.ico", ico(32));
    let transport = Arc::new(transport);

    let mut harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, transport.clone(), ["example.com"])
        .await
        .unwrap();

    assert!(icons.is_empty());
    let errors = harness.drain_errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ScrapeError::HtmlParse { .. }));
    // No candidates are probed after a parse failure
    assert_eq!(transport.requested(), vec!["https://example.com".to_string()]);
}

#[tokio::test]
async fn test_manifest_failures_are_warnings() {
    let transport = StaticTransport::default()
        .page(
            "https://example.com",
            head(
                r#"<link rel="manifest" href="/missing.webmanifest">
                   <link rel="icon" href="/icon.png">"#,
            ),
        )
        .page("https://example.com/icon.png", png(32, 32));

    let mut harness = Harness::new();
    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();

    assert_eq!(icons["example.com"].url, "https://example.com/icon.png");
    assert!(harness.drain_errors().is_empty());
    assert!(harness.drain_warnings().iter().any(|w| matches!(
        w,
        ScrapeError::HttpStatus { url, status: 404 } if url == "https://example.com/missing.webmanifest"
    )));
}

#[tokio::test]
async fn test_transient_failures_are_not_reported() {
    let transport = FlakyTransport {
        inner: StaticTransport::default()
            .page(
                "https://example.com",
                head(r#"<link rel="icon" href="/icon.png">"#),
            )
            .page("https://example.com/icon.png", png(64, 64))
            .page("https://example.com/favicon.ico", ico(16)),
        url: "https://example.com/icon.png".to_string(),
        failures_left: Mutex::new(2),
    };

    let mut harness = Harness::new();
    harness.config.http.max_attempts = 3;
    harness.config.http.retry_base_delay_ms = 1;

    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();

    assert_eq!(icons["example.com"].url, "https://example.com/icon.png");
    assert!(harness.drain_errors().is_empty());
    assert!(harness.drain_warnings().is_empty());
}

#[tokio::test]
async fn test_large_concurrency_is_accepted() {
    let transport = StaticTransport::default()
        .page("https://example.com", head(""))
        .page("https://example.com/favicon.ico", ico(32));

    let mut harness = Harness::new();
    harness.config.max_concurrent_requests = 1000;

    let icons = get_icons_with_transport(&harness.config, Arc::new(transport), ["example.com"])
        .await
        .unwrap();
    assert!(icons.contains_key("example.com"));
}
