//! Bounded-concurrency request dispatcher
//!
//! Every network request of a call goes through one dispatcher:
//! - Jobs are queued first-come-first-served on a channel
//! - A semaphore caps the number of requests in flight
//! - Each job is retried with linear backoff on transport errors and 5xx
//! - `close` stops intake, serves what is queued and waits for in-flight work

use crate::config::HttpConfig;
use crate::crawler::fetcher::{FetchResponse, Transport};
use crate::url::ensure_scheme;
use crate::ScrapeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};

/// Retry behavior for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Attempt `n` (zero-based) waits `n * base_delay` before starting
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Delay before the given zero-based attempt
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// A GET request waiting for a slot
struct FetchJob {
    url: String,
    reply: oneshot::Sender<Result<FetchResponse, ScrapeError>>,
}

/// Owner of the request queue and its serving task
pub struct Dispatcher {
    jobs: mpsc::UnboundedSender<FetchJob>,
    shutdown: oneshot::Sender<()>,
    pool: JoinHandle<()>,
}

/// Cloneable handle for submitting requests to a dispatcher
#[derive(Clone)]
pub struct DispatchHandle {
    jobs: mpsc::UnboundedSender<FetchJob>,
}

impl Dispatcher {
    /// Starts a dispatcher allowing `max_concurrent` requests in flight
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(transport: Arc<dyn Transport>, max_concurrent: usize, retry: RetryPolicy) -> Self {
        let (jobs, queue) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let pool = tokio::spawn(serve(
            queue,
            shutdown_rx,
            transport,
            max_concurrent.max(1),
            retry,
        ));

        Self {
            jobs,
            shutdown,
            pool,
        }
    }

    /// Returns a handle that can be moved into other tasks
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            jobs: self.jobs.clone(),
        }
    }

    /// Fetches a URL through this dispatcher
    pub async fn get(&self, url: &str) -> Result<FetchResponse, ScrapeError> {
        self.handle().get(url).await
    }

    /// Stops accepting jobs and waits for queued and in-flight requests
    ///
    /// `get` calls made on a handle after this starts fail with
    /// `DispatcherClosed`.
    pub async fn close(self) {
        let Dispatcher {
            jobs,
            shutdown,
            pool,
        } = self;
        drop(jobs);
        let _ = shutdown.send(());

        if let Err(e) = pool.await {
            tracing::error!("Request dispatcher task failed: {}", e);
        }
    }
}

impl DispatchHandle {
    /// Fetches a URL, waiting for a free slot first
    ///
    /// Bare hostnames and paths are prefixed with `https://`. The returned
    /// response carries the final URL after redirects.
    pub async fn get(&self, url: &str) -> Result<FetchResponse, ScrapeError> {
        let url = ensure_scheme(url);
        let (reply, response) = oneshot::channel();

        if self
            .jobs
            .send(FetchJob {
                url: url.clone(),
                reply,
            })
            .is_err()
        {
            return Err(ScrapeError::DispatcherClosed { url });
        }

        match response.await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::DispatcherClosed { url }),
        }
    }
}

enum PoolEvent {
    Job(Option<FetchJob>),
    Shutdown,
    Finished(Result<(), JoinError>),
}

/// Serves the job queue until shutdown, then drains
async fn serve(
    mut queue: mpsc::UnboundedReceiver<FetchJob>,
    mut shutdown: oneshot::Receiver<()>,
    transport: Arc<dyn Transport>,
    max_concurrent: usize,
    retry: RetryPolicy,
) {
    let slots = Arc::new(Semaphore::new(max_concurrent));
    let mut in_flight = JoinSet::new();
    let mut accepting = true;

    loop {
        let event = if accepting {
            tokio::select! {
                job = queue.recv() => PoolEvent::Job(job),
                _ = &mut shutdown => PoolEvent::Shutdown,
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    PoolEvent::Finished(finished)
                }
            }
        } else {
            PoolEvent::Job(queue.recv().await)
        };

        let job = match event {
            PoolEvent::Job(Some(job)) => job,
            PoolEvent::Job(None) => break,
            PoolEvent::Shutdown => {
                // Queued jobs are still served; new sends fail
                queue.close();
                accepting = false;
                continue;
            }
            PoolEvent::Finished(finished) => {
                log_finished(finished);
                continue;
            }
        };

        let permit = match slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let transport = Arc::clone(&transport);
        in_flight.spawn(async move {
            let result = fetch_with_retry(transport.as_ref(), &job.url, retry).await;
            drop(permit);
            let _ = job.reply.send(result);
        });
    }

    while let Some(finished) = in_flight.join_next().await {
        log_finished(finished);
    }
    tracing::debug!("Request dispatcher drained");
}

fn log_finished(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        tracing::error!("Request task failed: {}", e);
    }
}

/// Performs one GET with retries
///
/// Transport errors and 5xx responses are retried until the policy's attempts
/// run out; the last outcome is returned. Any other status ends the loop.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    url: &str,
    retry: RetryPolicy,
) -> Result<FetchResponse, ScrapeError> {
    let mut attempt = 0;

    loop {
        let delay = retry.delay_before(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = transport.fetch(url).await;
        attempt += 1;

        let retryable = match &result {
            Ok(response) => response.is_server_error(),
            Err(_) => true,
        };

        if !retryable || attempt >= retry.max_attempts {
            return result;
        }

        match &result {
            Ok(response) => tracing::trace!(
                "Attempt {}/{} for {} returned http {}, retrying",
                attempt,
                retry.max_attempts,
                url,
                response.status
            ),
            Err(e) => tracing::trace!(
                "Attempt {}/{} for {} failed: {}, retrying",
                attempt,
                retry.max_attempts,
                url,
                e
            ),
        }
    }
}
