//! Source adapters: the fetch-and-normalize boundary for each provider.

pub mod arxiv;
pub mod github;

pub use arxiv::ArxivSource;
pub use github::GitHubSource;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::DigestConfig;
use crate::error::SourceError;
use crate::model::{Category, DigestItem};

/// Timeout applied to every source request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent to providers (GitHub rejects requests without one).
pub(crate) const USER_AGENT: &str = concat!("daily-digest/", env!("CARGO_PKG_VERSION"));

/// A provider of digest items.
///
/// Implementations make exactly one outbound request per call and never
/// retry. Every failure is returned as a [`SourceError`].
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Category of the items this source produces.
    fn category(&self) -> Category;

    /// Fetch at most `limit` recent items matching `keyword`.
    async fn fetch(&self, keyword: &str, limit: usize) -> Result<Vec<DigestItem>, SourceError>;
}

/// Build the default adapters (GitHub, then arXiv) from configuration.
#[must_use]
pub fn default_sources(config: &DigestConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let client = http_client();
    vec![
        Arc::new(GitHubSource::new(
            client.clone(),
            config.github.clone(),
            config.lookback_hours,
        )),
        Arc::new(ArxivSource::new(client, config.arxiv.clone())),
    ]
}

/// Shared HTTP client for all sources.
#[must_use]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults without timeout or user agent");
            reqwest::Client::new()
        })
}
