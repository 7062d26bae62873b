//! Web app manifest processing
//!
//! A manifest (https://developer.mozilla.org/en-US/docs/Web/Manifest) lists
//! icons with declared sizes. The declared sizes are not trusted: every
//! listed icon is fetched and measured like any other candidate.

use crate::crawler::task_group::IconTaskGroup;
use crate::url::resolve_reference;
use crate::ScrapeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The parts of a web app manifest that matter for icons
///
/// Every field is optional and tolerates `null` or an unexpected type, so only
/// a body that is not JSON at all fails to parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebAppManifest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_icons")]
    pub icons: Vec<ManifestIcon>,
}

/// One entry of a manifest's `icons` list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestIcon {
    #[serde(default, deserialize_with = "lenient_string")]
    pub src: Option<String>,

    /// Declared sizes, e.g. `"192x192"`; informational only
    #[serde(default, deserialize_with = "lenient_string")]
    pub sizes: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub mime: Option<String>,

    /// Pixel density; strings and numbers both appear in the wild
    #[serde(default)]
    pub density: Option<Value>,
}

/// Reads strings as-is and numbers as their text; anything else is absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Reads an icon list, skipping entries that are not objects
fn lenient_icons<'de, D>(deserializer: D) -> Result<Vec<ManifestIcon>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Parses a manifest body
///
/// A leading UTF-8 byte order mark is ignored.
pub fn parse_manifest(url: &str, body: &[u8]) -> Result<WebAppManifest, ScrapeError> {
    let body = body.strip_prefix(b"\xef\xbb\xbf").unwrap_or(body);
    serde_json::from_slice(body).map_err(|source| ScrapeError::ManifestParse {
        url: url.to_string(),
        source,
    })
}

/// Resolves every icon listed in a manifest against the served host
pub fn manifest_candidates(host: &str, manifest: &WebAppManifest) -> Vec<String> {
    manifest
        .icons
        .iter()
        .filter_map(|icon| icon.src.as_deref())
        .filter(|src| !src.trim().is_empty())
        .filter_map(|src| match resolve_reference(host, src) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Skipping manifest icon on {}: {}", host, e);
                None
            }
        })
        .collect()
}

/// Fetches a manifest and spawns a probe for each icon it lists
///
/// Fetch failures and non-200 responses are warnings; malformed JSON is an
/// error. Either way the manifest simply contributes no candidates.
///
/// Returns the number of probes spawned.
pub async fn process_manifest(manifest_url: &str, host: &str, group: &mut IconTaskGroup) -> usize {
    let response = match group.dispatcher().get(manifest_url).await {
        Ok(response) => response,
        Err(e) => {
            group.reporter().warn(e);
            return 0;
        }
    };

    if !response.is_ok() {
        group.reporter().warn(ScrapeError::HttpStatus {
            url: manifest_url.to_string(),
            status: response.status,
        });
        return 0;
    }

    let manifest = match parse_manifest(manifest_url, &response.body) {
        Ok(manifest) => manifest,
        Err(e) => {
            group.reporter().error(e);
            return 0;
        }
    };

    tracing::debug!(
        "Manifest {} ({}) lists {} icons",
        manifest_url,
        manifest.name.as_deref().unwrap_or("unnamed"),
        manifest.icons.len()
    );

    manifest_candidates(host, &manifest)
        .into_iter()
        .filter(|url| group.spawn(url))
        .count()
}
