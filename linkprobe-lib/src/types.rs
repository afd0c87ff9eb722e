//! Core data types for probe runs.
//!
//! This module defines the per-request result, the run configuration, and
//! the per-window and per-run reports produced by the dispatcher.

use crate::aggregate::Summary;
use crate::utils::DEFAULT_TARGET;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Outcome of a single probe request.
///
/// A request either produced an HTTP status code or it failed before one was
/// available. Timeouts, DNS failures, refused connections and TLS errors all
/// collapse into `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStatus {
    /// The server answered with this HTTP status code
    Code(u16),

    /// The request failed before yielding a status code
    Error,
}

impl ProbeStatus {
    /// Key used for the error bucket in both status and category tallies.
    pub const ERROR_KEY: &'static str = "Error";

    /// The status code, if the request produced one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Error => f.write_str(Self::ERROR_KEY),
        }
    }
}

impl Serialize for ProbeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_u16(*code),
            Self::Error => serializer.serialize_str(Self::ERROR_KEY),
        }
    }
}

/// Result of one probe request.
///
/// Produced once per request attempt. Error results never carry a
/// subdomain.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// HTTP status or the error sentinel
    pub status: ProbeStatus,

    /// The subdomain that was probed (absent on error)
    pub subdomain: Option<String>,
}

impl ProbeResult {
    /// A request that completed with an HTTP status.
    pub fn success<S: Into<String>>(code: u16, subdomain: S) -> Self {
        Self {
            status: ProbeStatus::Code(code),
            subdomain: Some(subdomain.into()),
        }
    }

    /// A request that failed before yielding a status.
    pub fn error() -> Self {
        Self {
            status: ProbeStatus::Error,
            subdomain: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }
}

/// Configuration for a probe run.
///
/// # Example
///
/// ```rust
/// use linkprobe_lib::ProbeConfig;
/// use std::time::Duration;
///
/// let config = ProbeConfig::default()
///     .with_requests_per_window(10)
///     .with_windows(2)
///     .with_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.total_requests(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Requests launched together in each window
    /// Default: 5, must be at least 1
    pub requests_per_window: usize,

    /// Number of sequential windows
    /// Default: 3, must be at least 1
    pub windows: usize,

    /// Timeout for each individual request
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Minimum wall-clock length of a window; shorter windows are padded
    /// Default: 1 second
    pub window_duration: Duration,

    /// URL template; `{subdomain}` is replaced for every request
    pub target: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 5,
            windows: 3,
            timeout: Duration::from_secs(5),
            window_duration: Duration::from_secs(1),
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

impl ProbeConfig {
    /// Set the burst size. Zero is rejected when the dispatcher is built.
    pub fn with_requests_per_window(mut self, requests: usize) -> Self {
        self.requests_per_window = requests;
        self
    }

    /// Set the number of windows. Zero is rejected when the dispatcher is built.
    pub fn with_windows(mut self, windows: usize) -> Self {
        self.windows = windows;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the minimum window length.
    pub fn with_window_duration(mut self, window_duration: Duration) -> Self {
        self.window_duration = window_duration;
        self
    }

    /// Set the URL template.
    pub fn with_target<T: Into<String>>(mut self, target: T) -> Self {
        self.target = target.into();
        self
    }

    /// Number of requests the run will issue, saturating at `usize::MAX`.
    pub fn total_requests(&self) -> usize {
        self.requests_per_window.saturating_mul(self.windows)
    }
}

/// What happened in one window.
#[derive(Debug, Clone)]
pub struct WindowReport {
    /// Zero-based window number
    pub index: usize,

    /// Time from the first request launch until the last request finished
    pub elapsed: Duration,

    /// Sleep inserted after the burst to fill the window
    pub padding: Duration,

    /// Results in completion order
    pub results: Vec<ProbeResult>,
}

impl WindowReport {
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-window reports in execution order
    pub windows: Vec<WindowReport>,

    /// Aggregated tallies across all windows
    pub summary: Summary,

    /// Wall-clock time of the whole run, padding included
    pub total_duration: Duration,
}

impl RunReport {
    /// All results, window by window, in completion order.
    pub fn results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.windows.iter().flat_map(|w| w.results.iter())
    }

    pub fn total_requests(&self) -> usize {
        self.windows.iter().map(|w| w.results.len()).sum()
    }
}
