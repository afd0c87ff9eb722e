//! Error handling for probe runs.
//!
//! Two error types live here. `FetchError` describes why a single request
//! failed; it never leaves the per-request boundary except as a log line.
//! `LinkProbeError` covers the setup failures that can stop a run before it
//! starts (bad configuration, unreadable files, client construction).

use std::fmt;
use std::time::Duration;

/// Why a single probe request did not produce an HTTP status.
///
/// The dispatcher folds every variant into `ProbeStatus::Error`; the detail
/// is only kept so it can be logged.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request did not complete within its timeout
    Timeout { duration: Duration },

    /// DNS resolution or TCP/TLS connection failed
    Connect { message: String },

    /// Any other transport-level failure
    Request { message: String },
}

impl FetchError {
    /// Create a new timeout error.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create a new connection error.
    pub fn connect<M: Into<String>>(message: M) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a new generic request error.
    pub fn request<M: Into<String>>(message: M) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Short label used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::Request { .. } => "request",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { duration } => write!(f, "Timed out after {:?}", duration),
            Self::Connect { message } => write!(f, "Connection failed: {}", message),
            Self::Request { message } => write!(f, "Request failed: {}", message),
        }
    }
}

impl std::error::Error for FetchError {}

/// Main error type for setting up and running probes.
#[derive(Debug, Clone)]
pub enum LinkProbeError {
    /// Configuration errors (invalid settings, malformed values)
    ConfigError { message: String },

    /// File I/O errors when reading configuration
    FileError { path: String, message: String },

    /// The target template cannot produce a valid URL
    InvalidTarget { template: String, reason: String },

    /// The HTTP client could not be constructed
    ClientBuild { message: String },
}

impl LinkProbeError {
    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid target error.
    pub fn invalid_target<T: Into<String>, R: Into<String>>(template: T, reason: R) -> Self {
        Self::InvalidTarget {
            template: template.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LinkProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::FileError { path, message } => write!(f, "File error at '{}': {}", path, message),
            Self::InvalidTarget { template, reason } => {
                write!(f, "Invalid target '{}': {}", template, reason)
            }
            Self::ClientBuild { message } => write!(f, "Failed to create HTTP client: {}", message),
        }
    }
}

impl std::error::Error for LinkProbeError {}

impl From<toml::de::Error> for LinkProbeError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML configuration: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::timeout(Duration::from_secs(5)).kind(), "timeout");
        assert_eq!(FetchError::connect("dns").kind(), "connect");
        assert_eq!(FetchError::request("reset").kind(), "request");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Timed out after 5s");

        let err = FetchError::connect("no such host");
        assert!(err.to_string().contains("no such host"));
    }

    #[test]
    fn test_link_probe_error_display() {
        let err = LinkProbeError::invalid_target("https://x", "missing {subdomain}");
        assert_eq!(
            err.to_string(),
            "Invalid target 'https://x': missing {subdomain}"
        );

        let err = LinkProbeError::file_error("probe.toml", "not found");
        assert_eq!(err.to_string(), "File error at 'probe.toml': not found");
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let err: LinkProbeError = toml::from_str::<toml::Value>("= nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, LinkProbeError::ConfigError { .. }));
    }
}
