//! Fetching raw listing payloads.
//!
//! The aggregator only depends on the [`Fetch`] trait, so tests can swap
//! in an in-memory double instead of touching the network.

pub mod location;

pub use location::LocationFetcher;

use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain raw text for a location.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {location} timed out")]
    Timeout { location: String },
    #[error("cannot connect to {location}")]
    Connect { location: String },
    #[error("request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{location} returned HTTP {status}")]
    Status { location: String, status: u16 },
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

/// Capability to turn a source location into raw payload text.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned payloads keyed by location and records each request.
    #[derive(Default)]
    pub struct StaticFetcher {
        payloads: HashMap<String, String>,
        pub requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, location: &str, body: &str) -> Self {
            self.payloads.insert(location.to_string(), body.to_string());
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, location: &str) -> Result<String, FetchError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(location.to_string());
            }
            self.payloads
                .get(location)
                .cloned()
                .ok_or_else(|| FetchError::Io {
                    location: location.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no canned payload"),
                })
        }
    }
}
