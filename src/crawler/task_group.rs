//! Fan-out/fan-in of candidate icon probes for one domain
//!
//! Each spawned probe ends by sending exactly one message: the icon on the
//! success channel, or a unit on the failure channel. Collection therefore
//! takes exactly as many messages as probes were spawned, with no shared
//! counter between tasks.

use crate::crawler::dispatcher::DispatchHandle;
use crate::crawler::report::Reporter;
use crate::icon::{classify, Classification, Icon};
use crate::url::ensure_scheme;
use crate::ScrapeError;
use std::collections::HashSet;
use tokio::sync::mpsc;

/// Outcome of collecting every probe of a group
#[derive(Debug, Default)]
pub struct CollectedIcons {
    /// Icons from successful probes, in completion order
    pub icons: Vec<Icon>,

    /// Number of probes that failed
    pub failures: usize,

    /// Number of probes spawned
    pub spawned: usize,
}

/// Spawns and collects candidate probes for one domain
///
/// `spawn` takes `&mut self` and `collect` consumes the group, so spawning
/// after collection has started does not compile. Probes themselves run
/// concurrently with each other and with the spawning task.
pub struct IconTaskGroup {
    domain: String,
    dispatcher: DispatchHandle,
    reporter: Reporter,
    success_tx: mpsc::UnboundedSender<Icon>,
    successes: mpsc::UnboundedReceiver<Icon>,
    failure_tx: mpsc::UnboundedSender<()>,
    failures: mpsc::UnboundedReceiver<()>,
    spawned: usize,
    seen: HashSet<String>,
    max_candidates: usize,
    limit_reported: bool,
}

impl IconTaskGroup {
    pub fn new(
        domain: impl Into<String>,
        dispatcher: DispatchHandle,
        reporter: Reporter,
        max_candidates: usize,
    ) -> Self {
        let (success_tx, successes) = mpsc::unbounded_channel();
        let (failure_tx, failures) = mpsc::unbounded_channel();

        Self {
            domain: domain.into(),
            dispatcher,
            reporter,
            success_tx,
            successes,
            failure_tx,
            failures,
            spawned: 0,
            seen: HashSet::new(),
            max_candidates,
            limit_reported: false,
        }
    }

    /// The domain this group probes for
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Dispatcher shared by the group's probes
    pub fn dispatcher(&self) -> &DispatchHandle {
        &self.dispatcher
    }

    /// Reporter shared by the group's probes
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Number of probes spawned so far
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Starts a probe for `url`
    ///
    /// Returns false without spawning when the URL was already probed by this
    /// group or the candidate ceiling has been reached. The first candidate
    /// over the ceiling is reported as a warning.
    pub fn spawn(&mut self, url: impl AsRef<str>) -> bool {
        let url = ensure_scheme(url.as_ref());

        if !self.seen.insert(url.clone()) {
            tracing::trace!("Skipping duplicate candidate {}", url);
            return false;
        }

        if self.spawned >= self.max_candidates {
            if !self.limit_reported {
                self.limit_reported = true;
                self.reporter.warn(ScrapeError::CandidateLimit {
                    domain: self.domain.clone(),
                    limit: self.max_candidates,
                    url,
                });
            }
            return false;
        }

        self.spawned += 1;
        tracing::debug!("Probing candidate {} for {}", url, self.domain);

        let dispatcher = self.dispatcher.clone();
        let reporter = self.reporter.clone();
        let success_tx = self.success_tx.clone();
        let failure_tx = self.failure_tx.clone();

        tokio::spawn(async move {
            match probe(&dispatcher, &reporter, &url).await {
                Some(icon) => {
                    let _ = success_tx.send(icon);
                }
                None => {
                    let _ = failure_tx.send(());
                }
            }
        });

        true
    }

    /// Waits for every spawned probe and returns the successful ones
    pub async fn collect(self) -> CollectedIcons {
        let IconTaskGroup {
            domain,
            mut successes,
            mut failures,
            success_tx,
            failure_tx,
            spawned,
            ..
        } = self;

        // Only probes hold senders from here on
        drop(success_tx);
        drop(failure_tx);

        let mut collected = CollectedIcons {
            icons: Vec::with_capacity(spawned),
            failures: 0,
            spawned,
        };

        for _ in 0..spawned {
            tokio::select! {
                Some(icon) = successes.recv() => collected.icons.push(icon),
                Some(()) = failures.recv() => collected.failures += 1,
                else => {
                    // A probe panicked before signalling
                    tracing::error!(
                        "Probes for {} ended without reporting ({} of {} collected)",
                        domain,
                        collected.icons.len() + collected.failures,
                        spawned
                    );
                    break;
                }
            }
        }

        tracing::debug!(
            "Collected {} icons for {} ({} probes, {} failed)",
            collected.icons.len(),
            domain,
            spawned,
            collected.failures
        );
        collected
    }
}

/// Fetches and classifies one candidate
///
/// Returns the icon on success. Every failure except "not an image" is
/// reported before returning `None`.
async fn probe(dispatcher: &DispatchHandle, reporter: &Reporter, url: &str) -> Option<Icon> {
    let response = match dispatcher.get(url).await {
        Ok(response) => response,
        Err(e) => {
            reporter.error(e);
            return None;
        }
    };

    if !response.is_ok() {
        reporter.warn(ScrapeError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
        return None;
    }

    match classify(url, &response.body) {
        Classification::NotAnImage => {
            tracing::trace!("Candidate {} is not an image", url);
            None
        }
        Classification::DecodeError(message) => {
            reporter.warn(ScrapeError::Decode {
                url: url.to_string(),
                message,
            });
            None
        }
        classification => Icon::from_classification(url, classification, response.body),
    }
}
