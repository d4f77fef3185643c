//! Fetcher for http(s) URLs and local files.

use super::{Fetch, FetchError};
use crate::config::FetchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Fetches `http://`/`https://` locations over HTTP and reads anything
/// else as a local file path (an optional `file://` prefix is stripped).
pub struct LocationFetcher {
    http_client: reqwest::Client,
}

impl LocationFetcher {
    /// Create a fetcher using the configured timeout and user agent.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http_client })
    }

    async fn fetch_http(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    location: url.to_string(),
                }
            } else if e.is_connect() {
                FetchError::Connect {
                    location: url.to_string(),
                }
            } else {
                FetchError::Http {
                    location: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Http {
            location: url.to_string(),
            source: e,
        })
    }

    async fn fetch_file(&self, path: &str) -> Result<String, FetchError> {
        debug!("Reading {}", path);

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FetchError::Io {
                location: path.to_string(),
                source: e,
            })
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[async_trait]
impl Fetch for LocationFetcher {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        if is_remote(location) {
            self.fetch_http(location).await
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            self.fetch_file(path).await
        }
    }
}
