//! Run summary for the command line

use crate::crawler::IconMap;

/// Outcome of one run over a domain list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of domains requested
    pub requested: usize,

    /// Number of domains with a selected icon
    pub found: usize,

    /// Domains without an icon, in request order
    pub missing: Vec<String>,
}

impl RunSummary {
    pub fn from_results(domains: &[String], icons: &IconMap) -> Self {
        let missing: Vec<String> = domains
            .iter()
            .filter(|domain| !icons.contains_key(domain.as_str()))
            .cloned()
            .collect();

        Self {
            requested: domains.len(),
            found: domains.len() - missing.len(),
            missing,
        }
    }

    /// Percentage of requested domains with an icon
    pub fn hit_rate(&self) -> f64 {
        if self.requested > 0 {
            (self.found as f64 / self.requested as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints a run summary and the selected icons to stdout
pub fn print_summary(summary: &RunSummary, icons: &IconMap) {
    println!("=== Icon Summary ===\n");

    let mut found: Vec<_> = icons.iter().collect();
    found.sort_by(|a, b| a.0.cmp(b.0));

    if !found.is_empty() {
        println!("Icons:");
        for (domain, icon) in found {
            match (icon.width, icon.height) {
                (Some(width), Some(height)) => println!(
                    "  {}: {} ({}x{}, {})",
                    domain, icon.url, width, height, icon.mime
                ),
                _ => println!("  {}: {} ({})", domain, icon.url, icon.mime),
            }
        }
        println!();
    }

    if !summary.missing.is_empty() {
        println!("No Icon ({}):", summary.missing.len());
        for domain in &summary.missing {
            println!("  - {}", domain);
        }
        println!();
    }

    println!(
        "Hit Rate: {:.1}% ({} / {} domains)",
        summary.hit_rate(),
        summary.found,
        summary.requested
    );
}
