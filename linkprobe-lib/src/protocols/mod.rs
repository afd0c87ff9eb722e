//! Transport implementations used to issue probe requests.

/// HTTP GET transport (reqwest)
pub mod http;

pub use http::{Fetcher, HttpFetcher};
