//! HTML head scanner for icon references
//!
//! Only direct `<link>` and `<meta>` children of `<head>` are examined, in
//! document order:
//! - `<link rel="manifest" href="...">` → web app manifest
//! - `<link rel="icon|image_src|apple-touch-icon|shortcut icon|img|image" href="...">` → icon
//! - `<meta itemprop="image" content="...">` → icon
//!
//! Body content is never scanned.

use crate::url::resolve_reference;
use crate::ScrapeError;
use scraper::{Html, Selector};
use std::borrow::Cow;

/// `rel` values that mark a link as an icon candidate
pub const ICON_RELS: &[&str] = &[
    "icon",
    "image_src",
    "apple-touch-icon",
    "shortcut icon",
    "img",
    "image",
];

/// Bytes inspected when deciding whether a body is binary
const SNIFF_LEN: usize = 1024;

/// A resolved reference found in the document head
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadReference {
    /// Candidate icon URL
    Icon(String),

    /// Web app manifest URL
    Manifest(String),
}

/// Parses a fetched page and returns its head references
///
/// HTML parsing is lenient and recovers from malformed markup; the only
/// failure is a body that is binary rather than text.
///
/// # Arguments
///
/// * `page_url` - URL the body was served from, used in error messages
/// * `body` - Response body
/// * `host` - Served host that relative references resolve against
///
/// # Example
///
/// ```
/// use icon_scraper::crawler::{parse_html, HeadReference};
///
/// let html = br#"<html><head><link rel="icon" href="/i.png"></head></html>"#;
/// let refs = parse_html("https://example.com/", html, "example.com").unwrap();
/// assert_eq!(refs, vec![HeadReference::Icon("https://example.com/i.png".to_string())]);
/// ```
pub fn parse_html(page_url: &str, body: &[u8], host: &str) -> Result<Vec<HeadReference>, ScrapeError> {
    let html = decode_document(page_url, body)?;
    Ok(scan_head(&html, host))
}

/// Turns a response body into text, rejecting binary content
fn decode_document<'a>(page_url: &str, body: &'a [u8]) -> Result<Cow<'a, str>, ScrapeError> {
    let prefix = &body[..body.len().min(SNIFF_LEN)];
    if prefix.contains(&0) {
        return Err(ScrapeError::HtmlParse {
            url: page_url.to_string(),
            message: "response body is binary, not HTML".to_string(),
        });
    }

    Ok(String::from_utf8_lossy(body))
}

/// Extracts icon and manifest references from the document head
pub fn scan_head(html: &str, host: &str) -> Vec<HeadReference> {
    let document = Html::parse_document(html);
    let mut references = Vec::new();

    let selector = match Selector::parse("head > link, head > meta") {
        Ok(selector) => selector,
        Err(_) => return references,
    };

    for element in document.select(&selector) {
        let element = element.value();

        let reference = match element.name() {
            "link" => {
                let rel = element
                    .attr("rel")
                    .unwrap_or("")
                    .trim()
                    .to_ascii_lowercase();
                let href = match element.attr("href") {
                    Some(href) if !href.trim().is_empty() => href,
                    _ => continue,
                };

                if rel == "manifest" {
                    resolve_reference(host, href).map(HeadReference::Manifest)
                } else if ICON_RELS.contains(&rel.as_str()) {
                    resolve_reference(host, href).map(HeadReference::Icon)
                } else {
                    continue;
                }
            }
            "meta" => {
                if element.attr("itemprop") != Some("image") {
                    continue;
                }
                match element.attr("content") {
                    Some(content) if !content.trim().is_empty() => {
                        resolve_reference(host, content).map(HeadReference::Icon)
                    }
                    _ => continue,
                }
            }
            _ => continue,
        };

        match reference {
            Ok(reference) => references.push(reference),
            Err(e) => tracing::debug!("Skipping head reference on {}: {}", host, e),
        }
    }

    references
}
