//! Output module for scraped icons
//!
//! This module handles:
//! - Writing selected icons to disk as `{domain}.{ext}`
//! - Summarizing a run for the command line

pub mod stats;

pub use stats::{print_summary, RunSummary};

use crate::crawler::IconMap;
use crate::ScrapeError;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes every icon to `dir`, creating the directory if needed
///
/// Files are named after the domain with an extension derived from the
/// icon's MIME type and are written in domain order. Existing files are
/// overwritten.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of the written files
/// * `Err(ScrapeError)` - The directory or a file could not be written
pub fn save_icons(dir: &Path, icons: &IconMap) -> Result<Vec<PathBuf>, ScrapeError> {
    fs::create_dir_all(dir)?;

    let mut domains: Vec<&String> = icons.keys().collect();
    domains.sort();

    let mut written = Vec::with_capacity(domains.len());
    for domain in domains {
        let icon = &icons[domain];
        let path = dir.join(format!("{}.{}", domain, icon.extension()));
        fs::write(&path, &icon.source)?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), icon.source.len());
        written.push(path);
    }

    Ok(written)
}
