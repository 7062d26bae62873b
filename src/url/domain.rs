use crate::UrlError;
use url::Url;

/// Longest domain string accepted for scraping
pub const MAX_DOMAIN_LENGTH: usize = 512;

/// Longest single label allowed by DNS
const MAX_LABEL_LENGTH: usize = 63;

/// Validates a domain string before anything is fetched for it
///
/// The grammar is deliberately conservative: ASCII letters, digits and
/// hyphens in dot-separated labels, at least two labels, no empty labels and
/// no label starting or ending with a hyphen.
///
/// # Examples
///
/// ```
/// use icon_scraper::url::validate_domain;
///
/// assert!(validate_domain("rust-lang.org").is_ok());
/// assert!(validate_domain("localhost").is_err());
/// ```
pub fn validate_domain(domain: &str) -> Result<(), UrlError> {
    if domain.is_empty() {
        return Err(UrlError::EmptyDomain);
    }

    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(UrlError::DomainTooLong(domain.len()));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(UrlError::Malformed(
            "domain contains invalid characters".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(UrlError::Malformed(
            "domain must contain at least one dot (e.g., 'example.com')".to_string(),
        ));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(UrlError::Malformed("domain has an empty label".to_string()));
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(UrlError::Malformed(format!(
                "label '{}' is longer than {} characters",
                label, MAX_LABEL_LENGTH
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(UrlError::Malformed(format!(
                "label '{}' cannot start or end with '-'",
                label
            )));
        }
    }

    Ok(())
}

/// Extracts the host a page was actually served from, keeping a
/// non-default port
///
/// Relative icon references resolve against this host, so a domain that
/// redirects to `www.` or to another site gets its icons from there.
///
/// ```
/// use url::Url;
/// use icon_scraper::url::served_host;
///
/// let url = Url::parse("https://WWW.Example.com/home").unwrap();
/// assert_eq!(served_host(&url), Some("www.example.com".to_string()));
/// ```
pub fn served_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
