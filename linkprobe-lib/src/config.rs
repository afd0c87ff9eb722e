//! Configuration file parsing and merging.
//!
//! A config file is only read when the caller names one explicitly; nothing
//! is discovered automatically. Values from the file sit between the
//! built-in defaults and CLI flags in precedence.
//!
//! ```toml
//! [defaults]
//! requests_per_window = 10
//! windows = 5
//! timeout = "3s"
//! window = "1s"
//! target = "https://{subdomain}.page.link/.well-known/apple-app-site-association"
//!
//! [output]
//! json = false
//! pretty = true
//! ```

use crate::error::LinkProbeError;
use crate::types::ProbeConfig;
use crate::utils::validate_target;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Configuration loaded from a TOML file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for run parameters
    pub defaults: Option<DefaultsConfig>,

    /// Output formatting preferences
    pub output: Option<OutputConfig>,
}

/// Run parameters that map to CLI options.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Requests launched together in each window
    pub requests_per_window: Option<usize>,

    /// Number of windows
    pub windows: Option<usize>,

    /// Per-request timeout (as string, e.g., "5s", "500ms")
    pub timeout: Option<String>,

    /// Minimum window length (as string, e.g., "1s")
    pub window: Option<String>,

    /// URL template containing `{subdomain}`
    pub target: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Print the summary as JSON
    pub json: Option<bool>,

    /// Colored, sectioned text output
    pub pretty: Option<bool>,
}

impl FileConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LinkProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LinkProbeError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LinkProbeError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, LinkProbeError> {
        let config: FileConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate a configuration for common issues.
    pub fn validate(&self) -> Result<(), LinkProbeError> {
        let Some(defaults) = &self.defaults else {
            return Ok(());
        };

        if let Some(requests) = defaults.requests_per_window {
            if requests == 0 {
                return Err(LinkProbeError::config("requests_per_window must be at least 1"));
            }
        }

        if defaults.windows == Some(0) {
            return Err(LinkProbeError::config("windows must be at least 1"));
        }

        if let Some(timeout) = &defaults.timeout {
            match parse_duration_string(timeout) {
                Some(d) if !d.is_zero() => {}
                _ => {
                    return Err(LinkProbeError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '500ms', '2m'",
                        timeout
                    )));
                }
            }
        }

        if let Some(window) = &defaults.window {
            if parse_duration_string(window).is_none() {
                return Err(LinkProbeError::config(format!(
                    "Invalid window format '{}'. Use format like '1s', '500ms'",
                    window
                )));
            }
        }

        if let Some(target) = &defaults.target {
            validate_target(target)?;
        }

        Ok(())
    }

    /// Overlay file values onto `config`; unset fields are left alone.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(requests) = defaults.requests_per_window {
                config = config.with_requests_per_window(requests);
            }
            if let Some(windows) = defaults.windows {
                config = config.with_windows(windows);
            }
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
                config = config.with_timeout(timeout);
            }
            if let Some(window) = defaults.window.as_deref().and_then(parse_duration_string) {
                config = config.with_window_duration(window);
            }
            if let Some(target) = &defaults.target {
                config = config.with_target(target.trim());
            }
        }
        config
    }
}

/// Parse a duration string like "5s", "500ms", "2m", or bare seconds.
///
/// ```
/// use linkprobe_lib::parse_duration_string;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
/// assert_eq!(parse_duration_string("250ms"), Some(Duration::from_millis(250)));
/// assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
/// assert_eq!(parse_duration_string("7"), Some(Duration::from_secs(7)));
/// assert_eq!(parse_duration_string("soon"), None);
/// ```
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<f64>().ok().and_then(secs_to_duration)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        // Assume seconds if no unit
        value.parse::<f64>().ok().and_then(secs_to_duration)
    }
}

fn secs_to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}
