//! # Linkprobe Library
//!
//! Probes a URL template across randomly generated subdomains in fixed-size,
//! rate-limited bursts and aggregates the HTTP status codes that come back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkprobe_lib::{BatchDispatcher, ProbeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProbeConfig::default()
//!         .with_requests_per_window(5)
//!         .with_windows(3);
//!
//!     let report = BatchDispatcher::new(config)?.run().await;
//!
//!     for (category, count) in report.summary.categories.sorted() {
//!         println!("{}: {}", category, count);
//!     }
//!     println!("total: {}", report.summary.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Windowed dispatch**: a burst of concurrent requests per window, with
//!   each window padded to a minimum duration
//! - **Failure as data**: timeouts and network errors become an `Error`
//!   status instead of aborting the run
//! - **Aggregation**: per-status, per-category and per-subdomain views

// Re-export main public API types and functions
pub use aggregate::{
    category_of, summarize, Aggregator, CategoryTally, StatusTally, SubdomainEntry, SubdomainLog,
    Summary,
};
pub use config::{parse_duration_string, DefaultsConfig, FileConfig, OutputConfig};
pub use dispatcher::{probe, BatchDispatcher};
pub use error::{FetchError, LinkProbeError};
pub use protocols::{Fetcher, HttpFetcher};
pub use types::{ProbeConfig, ProbeResult, ProbeStatus, RunReport, WindowReport};
pub use utils::{build_probe_url, validate_target, DEFAULT_TARGET, SUBDOMAIN_PLACEHOLDER};

// Public modules
pub mod generate;

pub use generate::{generate_batch, generate_subdomain};

// Internal modules - these are not part of the public API
mod aggregate;
mod config;
mod dispatcher;
mod error;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LinkProbeError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
