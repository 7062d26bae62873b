//! icon-scraper main entry point
//!
//! Command-line interface that finds the best icon for each given domain.

use anyhow::{bail, Context};
use clap::Parser;
use icon_scraper::config::{load_config, load_domain_list, validate, Config};
use icon_scraper::get_icons;
use icon_scraper::output::{print_summary, save_icons, RunSummary};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// icon-scraper: finds the best icon for each domain
///
/// Every domain's home page, web app manifest and /favicon.ico are probed,
/// and the icon closest to the target height is selected.
#[derive(Parser, Debug)]
#[command(name = "icon-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Finds the best icon for each domain", long_about = None)]
struct Cli {
    /// Domains to look up, e.g. rust-lang.org
    #[arg(value_name = "DOMAIN")]
    domains: Vec<String>,

    /// Read additional domains from a file, one per line
    #[arg(short, long, value_name = "FILE")]
    domains_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only accept square icons
    #[arg(long)]
    square_only: bool,

    /// Preferred icon height in pixels
    #[arg(long, value_name = "PIXELS")]
    target_height: Option<u32>,

    /// Prefer an SVG icon when one is found
    #[arg(long)]
    allow_svg: bool,

    /// Maximum number of requests in flight
    #[arg(long, value_name = "N")]
    max_concurrent: Option<u32>,

    /// Write the selected icons to this directory as {domain}.{ext}
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let domains = collect_domains(&cli)?;
    if domains.is_empty() {
        bail!("no domains given; pass them as arguments or with --domains-file");
    }

    tracing::info!(
        "Looking up icons for {} domains (target height {}px, {} requests in flight)",
        domains.len(),
        config.target_height,
        config.max_concurrent_requests
    );

    let icons = get_icons(&config, domains.iter().cloned())
        .await
        .context("icon lookup failed")?;

    if let Some(dir) = &cli.output_dir {
        let written = save_icons(dir, &icons)
            .with_context(|| format!("failed to write icons to {}", dir.display()))?;
        tracing::info!("Wrote {} icons to {}", written.len(), dir.display());
    }

    if !cli.quiet {
        let summary = RunSummary::from_results(&domains, &icons);
        print_summary(&summary, &icons);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("icon_scraper=info,warn"),
            1 => EnvFilter::new("icon_scraper=debug,info"),
            2 => EnvFilter::new("icon_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    if cli.square_only {
        config.square_only = true;
    }
    if cli.allow_svg {
        config.allow_svg = true;
    }
    if let Some(height) = cli.target_height {
        config.target_height = height;
    }
    if let Some(max) = cli.max_concurrent {
        config.max_concurrent_requests = max;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Merges positional domains with the domain file, dropping duplicates
fn collect_domains(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut domains = cli.domains.clone();
    if let Some(path) = &cli.domains_file {
        let listed = load_domain_list(path)
            .with_context(|| format!("failed to read domain list {}", path.display()))?;
        domains.extend(listed);
    }

    let mut seen = HashSet::new();
    domains.retain(|domain| seen.insert(domain.clone()));
    Ok(domains)
}
