use crate::UrlError;
use url::Url;

/// Returns true if the string is an absolute URL with both scheme and host
pub fn is_absolute_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| url.has_host() && !url.scheme().is_empty())
        .unwrap_or(false)
}

/// Prefixes `https://` onto bare hostnames and paths
///
/// # Examples
///
/// ```
/// use icon_scraper::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "https://example.com");
/// assert_eq!(ensure_scheme("http://example.com/a.png"), "http://example.com/a.png");
/// ```
pub fn ensure_scheme(target: &str) -> String {
    if is_absolute_url(target) {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

/// Resolves an icon reference found on a page against the served host
///
/// - Absolute URLs pass through unchanged
/// - Protocol-relative references (`//cdn.example.com/x.png`) get `https:`
/// - Everything else is joined to `https://{host}` with exactly one slash
///
/// References that can never be an icon download (`data:`, `javascript:`,
/// `mailto:`, fragment-only) are rejected.
///
/// # Examples
///
/// ```
/// use icon_scraper::url::resolve_reference;
///
/// assert_eq!(
///     resolve_reference("example.com", "/img/icon.png").unwrap(),
///     "https://example.com/img/icon.png"
/// );
/// assert_eq!(
///     resolve_reference("example.com", "icon.png").unwrap(),
///     "https://example.com/icon.png"
/// );
/// ```
pub fn resolve_reference(host: &str, reference: &str) -> Result<String, UrlError> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Ok(format!("https://{}", host));
    }

    let lowered = reference.to_ascii_lowercase();
    if lowered.starts_with("data:")
        || lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || reference.starts_with('#')
    {
        return Err(UrlError::Unsupported(truncate(reference)));
    }

    if is_absolute_url(reference) {
        return Ok(reference.to_string());
    }

    if reference.starts_with("//") {
        return Ok(format!("https:{}", reference));
    }

    if let Some(path) = reference.strip_prefix('/') {
        return Ok(format!("https://{}/{}", host, path));
    }

    Ok(format!("https://{}/{}", host, reference))
}

/// Returns true if the URL path names an SVG file (case-insensitive)
///
/// Query strings and fragments are ignored.
pub fn is_svg_url(target: &str) -> bool {
    let path = match Url::parse(target) {
        Ok(url) => url.path().to_string(),
        Err(_) => target
            .split(&['?', '#'][..])
            .next()
            .unwrap_or(target)
            .to_string(),
    };
    path.to_ascii_lowercase().ends_with(".svg")
}

/// Keeps error messages readable when a page inlines a huge data URI
fn truncate(reference: &str) -> String {
    const LIMIT: usize = 48;
    match reference.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &reference[..idx]),
        None => reference.to_string(),
    }
}
