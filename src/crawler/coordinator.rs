//! Domain orchestration and the public entry points
//!
//! One `DomainRun` per requested domain walks the stages
//! `Validating → FetchingRoot → Parsing → Discovering → Collecting →
//! Selecting → Done`. All runs of a call share a single dispatcher, so the
//! number of requests in flight stays under the configured ceiling however
//! many domains and candidates there are.

use crate::config::{validate, Config};
use crate::crawler::dispatcher::{DispatchHandle, Dispatcher, RetryPolicy};
use crate::crawler::fetcher::{ReqwestTransport, Transport};
use crate::crawler::manifest::process_manifest;
use crate::crawler::parser::{parse_html, HeadReference};
use crate::crawler::report::{CallSinks, Reporter};
use crate::crawler::task_group::IconTaskGroup;
use crate::icon::{select, Icon};
use crate::state::DomainStage;
use crate::url::{served_host, validate_domain};
use crate::ScrapeError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Selected icon per domain; domains without an icon are absent
pub type IconMap = HashMap<String, Icon>;

/// Finds the best icon for each domain
///
/// Domains are processed concurrently. Failures are reported on the
/// configured sinks (or logged) and never abort the run; a domain with no
/// acceptable icon is simply missing from the map. `Err` is only returned
/// for setup failures: an invalid configuration or an HTTP client that
/// cannot be built.
///
/// # Example
///
/// ```no_run
/// use icon_scraper::{get_icons, Config};
///
/// # async fn example() -> icon_scraper::Result<()> {
/// let config = Config { square_only: true, target_height: 128, ..Config::default() };
/// let icons = get_icons(&config, ["rust-lang.org", "gov.uk"]).await?;
/// for (domain, icon) in &icons {
///     println!("{}: {} ({:?}px)", domain, icon.url, icon.height);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn get_icons<I, S>(config: &Config, domains: I) -> Result<IconMap, ScrapeError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    validate(config)?;
    let transport = Arc::new(ReqwestTransport::new(&config.http)?);
    get_icons_with_transport(config, transport, domains).await
}

/// Finds the best icon for a single domain
pub async fn get_icon(config: &Config, domain: &str) -> Result<Option<Icon>, ScrapeError> {
    let mut icons = get_icons(config, [domain]).await?;
    Ok(icons.remove(domain))
}

/// Runs the pipeline over a caller-supplied transport
pub async fn get_icons_with_transport<I, S>(
    config: &Config,
    transport: Arc<dyn Transport>,
    domains: I,
) -> Result<IconMap, ScrapeError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    validate(config)?;

    let config = Arc::new(config.clone());
    let sinks = CallSinks::open(&config);
    let dispatcher = Dispatcher::new(
        transport,
        config.max_concurrent_requests as usize,
        RetryPolicy::from_config(&config.http),
    );

    let mut runs = JoinSet::new();
    for domain in domains {
        let run = DomainRun::new(
            domain.into(),
            Arc::clone(&config),
            dispatcher.handle(),
            sinks.reporter(),
        );
        runs.spawn(run.execute());
    }
    let requested = runs.len();

    let mut icons = IconMap::with_capacity(requested);
    while let Some(finished) = runs.join_next().await {
        match finished {
            Ok((domain, Some(icon))) => {
                icons.insert(domain, icon);
            }
            Ok((domain, None)) => tracing::debug!("No icon found for {}", domain),
            Err(e) => tracing::error!("Domain task failed: {}", e),
        }
    }

    dispatcher.close().await;
    sinks.close().await;

    tracing::info!("Found icons for {} of {} domains", icons.len(), requested);
    Ok(icons)
}

/// Pipeline state for one domain
struct DomainRun {
    domain: String,
    stage: DomainStage,
    config: Arc<Config>,
    dispatcher: DispatchHandle,
    reporter: Reporter,
}

impl DomainRun {
    fn new(
        domain: String,
        config: Arc<Config>,
        dispatcher: DispatchHandle,
        reporter: Reporter,
    ) -> Self {
        Self {
            domain,
            stage: DomainStage::Validating,
            config,
            dispatcher,
            reporter,
        }
    }

    /// Runs the domain to completion, keyed by the domain as requested
    async fn execute(mut self) -> (String, Option<Icon>) {
        let icon = match self.run().await {
            Ok(icon) => icon,
            Err(e) => {
                self.reporter.error(e);
                None
            }
        };
        (self.domain, icon)
    }

    async fn run(&mut self) -> Result<Option<Icon>, ScrapeError> {
        if let Err(source) = validate_domain(&self.domain) {
            self.reporter.warn(ScrapeError::InvalidDomain {
                domain: self.domain.clone(),
                source,
            });
            return self.abandon();
        }

        self.advance(DomainStage::FetchingRoot)?;
        let root_url = format!("https://{}", self.domain);
        let response = match self.dispatcher.get(&root_url).await {
            Ok(response) => response,
            Err(e) => {
                self.reporter.warn(e);
                return self.abandon();
            }
        };
        if !response.is_ok() {
            tracing::debug!(
                "Home page of {} returned http {}, scanning it anyway",
                self.domain,
                response.status
            );
        }

        self.advance(DomainStage::Parsing)?;
        // Relative references resolve against wherever the page was served from
        let host = Url::parse(&response.final_url)
            .ok()
            .and_then(|url| served_host(&url))
            .unwrap_or_else(|| self.domain.to_lowercase());
        if host != self.domain {
            tracing::debug!("{} is served from {}", self.domain, host);
        }

        let references = match parse_html(&response.final_url, &response.body, &host) {
            Ok(references) => references,
            Err(e) => {
                self.reporter.error(e);
                return self.abandon();
            }
        };

        self.advance(DomainStage::Discovering)?;
        let mut group = IconTaskGroup::new(
            host.clone(),
            self.dispatcher.clone(),
            self.reporter.clone(),
            self.config.http.max_candidates_per_domain,
        );
        group.spawn(format!("https://{}/favicon.ico", host));
        for reference in references {
            match reference {
                HeadReference::Icon(url) => {
                    group.spawn(url);
                }
                HeadReference::Manifest(url) => {
                    process_manifest(&url, &host, &mut group).await;
                }
            }
        }

        self.advance(DomainStage::Collecting)?;
        let mut collected = group.collect().await;

        self.advance(DomainStage::Selecting)?;
        // Completion order is network timing; sort for a reproducible choice
        collected.icons.sort_by(|a, b| a.url.cmp(&b.url));
        let icon = select(&self.config, &collected.icons).cloned();
        if let Some(icon) = &icon {
            tracing::debug!(
                "Selected {} for {} ({} candidates)",
                icon.url,
                self.domain,
                collected.icons.len()
            );
        }

        self.advance(DomainStage::Done)?;
        Ok(icon)
    }

    /// Moves to the next stage, rejecting illegal transitions
    fn advance(&mut self, to: DomainStage) -> Result<(), ScrapeError> {
        if !self.stage.can_transition_to(to) {
            return Err(ScrapeError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        tracing::trace!("{}: {} -> {}", self.domain, self.stage, to);
        self.stage = to;
        Ok(())
    }

    /// Ends the run without an icon
    fn abandon(&mut self) -> Result<Option<Icon>, ScrapeError> {
        self.advance(DomainStage::Done)?;
        Ok(None)
    }
}
