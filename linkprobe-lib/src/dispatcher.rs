//! Windowed batch dispatcher.
//!
//! A run is a fixed number of windows executed strictly one after another.
//! Each window:
//! 1. launches `requests_per_window` probes at once, one tokio task each,
//! 2. waits for every task to finish (response, error, or timeout),
//! 3. sleeps out the rest of `window_duration` if the burst was faster.
//!
//! A slow window is never made up for later. Results are collected by the
//! coordinating loop after the join, so workers never write shared state.

use crate::aggregate::Aggregator;
use crate::error::{FetchError, LinkProbeError};
use crate::generate::generate_subdomain;
use crate::protocols::{Fetcher, HttpFetcher};
use crate::types::{ProbeConfig, ProbeResult, RunReport, WindowReport};
use crate::utils::{build_probe_url, validate_target};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Probe a single URL, folding every failure into an error result.
///
/// The request is abandoned once `timeout` elapses. Nothing in here can
/// fail: the return value is always either a status or the error sentinel.
pub async fn probe<F: Fetcher>(
    fetcher: &F,
    subdomain: String,
    url: &str,
    timeout: Duration,
) -> ProbeResult {
    let outcome = match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(FetchError::timeout(timeout)),
    };

    match outcome {
        Ok(code) => {
            trace!(%url, status = code, "probe answered");
            ProbeResult::success(code, subdomain)
        }
        Err(e) => {
            debug!(%url, kind = e.kind(), error = %e, "probe failed");
            ProbeResult::error()
        }
    }
}

/// Runs windows of concurrent probes against a target template.
///
/// # Example
///
/// ```rust,no_run
/// use linkprobe_lib::{BatchDispatcher, ProbeConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let dispatcher = BatchDispatcher::new(ProbeConfig::default())?;
///     let report = dispatcher.run().await;
///
///     for (status, count) in report.summary.statuses.sorted() {
///         println!("{}: {}", status, count);
///     }
///     Ok(())
/// }
/// ```
pub struct BatchDispatcher<F: Fetcher = HttpFetcher> {
    /// Run parameters
    config: ProbeConfig,
    /// Transport shared by every worker task
    fetcher: Arc<F>,
}

impl BatchDispatcher<HttpFetcher> {
    /// Create a dispatcher backed by a reqwest client.
    pub fn new(config: ProbeConfig) -> Result<Self, LinkProbeError> {
        let fetcher = HttpFetcher::with_timeout(config.timeout)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> BatchDispatcher<F> {
    /// Create a dispatcher with a custom transport.
    pub fn with_fetcher(config: ProbeConfig, fetcher: F) -> Result<Self, LinkProbeError> {
        validate_config(&config)?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Execute every window and aggregate the results.
    pub async fn run(&self) -> RunReport {
        self.run_with_progress(|_| {}).await
    }

    /// Execute every window, calling `progress` after each one completes.
    pub async fn run_with_progress<P>(&self, mut progress: P) -> RunReport
    where
        P: FnMut(&WindowReport),
    {
        info!(
            requests_per_window = self.config.requests_per_window,
            windows = self.config.windows,
            timeout_ms = self.config.timeout.as_millis() as u64,
            target = %self.config.target,
            "starting probe run"
        );

        let run_start = Instant::now();
        let mut aggregator = Aggregator::new();
        let mut windows = Vec::new();

        for index in 0..self.config.windows {
            let window = self.run_window(index).await;
            aggregator = aggregator.absorb(&window.results);
            progress(&window);
            windows.push(window);
        }

        let summary = aggregator.finish();
        let total_duration = run_start.elapsed();

        info!(
            total = summary.total(),
            errors = summary.error_count(),
            elapsed_ms = total_duration.as_millis() as u64,
            "probe run finished"
        );

        RunReport {
            windows,
            summary,
            total_duration,
        }
    }

    /// Fan out one burst, join it, then pad the window.
    async fn run_window(&self, index: usize) -> WindowReport {
        let start = Instant::now();
        let mut tasks = JoinSet::new();

        for _ in 0..self.config.requests_per_window {
            let subdomain = generate_subdomain();
            let url = build_probe_url(&self.config.target, &subdomain);
            let fetcher = Arc::clone(&self.fetcher);
            let timeout = self.config.timeout;

            tasks.spawn(async move { probe(fetcher.as_ref(), subdomain, &url, timeout).await });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    // A panicking worker still counts as one issued request.
                    warn!(window = index, error = %e, "probe task did not complete");
                    results.push(ProbeResult::error());
                }
            }
        }

        let elapsed = start.elapsed();
        let padding = self.config.window_duration.saturating_sub(elapsed);
        if !padding.is_zero() {
            tokio::time::sleep(padding).await;
        }

        let window = WindowReport {
            index,
            elapsed,
            padding,
            results,
        };

        debug!(
            window = index,
            elapsed_ms = elapsed.as_millis() as u64,
            padding_ms = padding.as_millis() as u64,
            errors = window.error_count(),
            "window complete"
        );

        window
    }
}

/// Reject configurations that cannot produce a meaningful run.
fn validate_config(config: &ProbeConfig) -> Result<(), LinkProbeError> {
    if config.requests_per_window == 0 {
        return Err(LinkProbeError::config("Requests per window must be at least 1"));
    }

    if config.windows == 0 {
        return Err(LinkProbeError::config("Number of windows must be at least 1"));
    }

    if config.timeout.is_zero() {
        return Err(LinkProbeError::config("Timeout must be greater than zero"));
    }

    validate_target(&config.target)
}
