//! HTTP transport for probe requests.
//!
//! The dispatcher only needs one thing from the network: "GET this URL and
//! tell me the status code". That is the `Fetcher` trait. `HttpFetcher` is
//! the reqwest-backed implementation used by the CLI; tests plug in their
//! own fetchers to script latency and failures.

use crate::error::{FetchError, LinkProbeError};
use std::future::Future;
use std::time::Duration;

/// Something that can issue a GET request and report the status code.
///
/// Implementations must be shareable across tasks; the dispatcher holds one
/// instance behind an `Arc` and calls it from every worker in a window.
pub trait Fetcher: Send + Sync + 'static {
    /// Issue a GET for `url` and return the HTTP status code.
    ///
    /// Any status, including 4xx and 5xx, is a successful fetch. Only
    /// failures that prevent a status from being read are errors.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<u16, FetchError>> + Send;
}

/// reqwest-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    /// HTTP client shared by all requests
    http_client: reqwest::Client,
    /// Client timeout, reported when a request is cut off
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose client gives up after `timeout`.
    ///
    /// The dispatcher wraps every call in its own timeout as well; the client
    /// timeout makes sure the underlying connection is dropped too.
    pub fn with_timeout(timeout: Duration) -> Result<Self, LinkProbeError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LinkProbeError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::timeout(self.timeout)
        } else if err.is_connect() {
            FetchError::connect(err.to_string())
        } else {
            FetchError::request(err.to_string())
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Ok(response.status().as_u16())
    }
}
