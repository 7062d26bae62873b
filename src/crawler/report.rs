//! Error and warning sinks for one call
//!
//! Callers may pass their own sinks in `Config`. When a sink is unset, a
//! logging sink is created at call start and drained and closed before the
//! call returns; nothing here outlives the call.

use crate::config::{Config, ReportSink};
use crate::ScrapeError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

/// Cloneable reporting handle shared by every task of a call
///
/// Sending never blocks.
#[derive(Debug, Clone)]
pub struct Reporter {
    errors: ReportSink,
    warnings: ReportSink,
}

impl Reporter {
    pub fn new(errors: ReportSink, warnings: ReportSink) -> Self {
        Self { errors, warnings }
    }

    /// Reports an error
    pub fn error(&self, error: ScrapeError) {
        tracing::debug!("Reporting error: {}", error);
        let _ = self.errors.send(error);
    }

    /// Reports a warning
    pub fn warn(&self, warning: ScrapeError) {
        tracing::debug!("Reporting warning: {}", warning);
        let _ = self.warnings.send(warning);
    }
}

/// The sinks of one call, plus any logging drains created for it
pub struct CallSinks {
    reporter: Reporter,
    drains: Vec<JoinHandle<()>>,
}

impl CallSinks {
    /// Opens the sinks for a call, creating logging sinks where unset
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(config: &Config) -> Self {
        let mut drains = Vec::new();

        let errors = match &config.errors {
            Some(sink) => sink.clone(),
            None => {
                let (sink, drain) = logging_sink(Severity::Error);
                drains.push(drain);
                sink
            }
        };

        let warnings = match &config.warnings {
            Some(sink) => sink.clone(),
            None => {
                let (sink, drain) = logging_sink(Severity::Warning);
                drains.push(drain);
                sink
            }
        };

        Self {
            reporter: Reporter::new(errors, warnings),
            drains,
        }
    }

    pub fn reporter(&self) -> Reporter {
        self.reporter.clone()
    }

    /// Closes the call's sinks and waits for logging sinks to drain
    ///
    /// Every other `Reporter` clone must already be dropped, otherwise this
    /// waits for them.
    pub async fn close(self) {
        let CallSinks { reporter, drains } = self;
        drop(reporter);

        for drain in drains {
            if let Err(e) = drain.await {
                tracing::error!("Report drain task failed: {}", e);
            }
        }
    }
}

/// Creates a sink whose messages are written to the log
fn logging_sink(severity: Severity) -> (ReportSink, JoinHandle<()>) {
    let (sink, mut messages) = mpsc::unbounded_channel::<ScrapeError>();

    let drain = tokio::spawn(async move {
        while let Some(message) = messages.recv().await {
            match severity {
                Severity::Error => tracing::error!("{}", message),
                Severity::Warning => tracing::warn!("{}", message),
            }
        }
    });

    (sink, drain)
}
