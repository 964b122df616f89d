//! GitHub repository search source.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, warn};

use super::SourceAdapter;
use crate::config::GitHubConfig;
use crate::error::{SourceError, SourceFailure};
use crate::model::{Category, DigestItem};

/// Public GitHub REST API.
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

const PROVIDER: &str = "github";

/// Searches repositories pushed within the lookback window, most recently
/// updated first.
pub struct GitHubSource {
    client: reqwest::Client,
    config: GitHubConfig,
    lookback_hours: u32,
}

impl GitHubSource {
    /// Create a new GitHub source.
    #[must_use]
    pub fn new(client: reqwest::Client, config: GitHubConfig, lookback_hours: u32) -> Self {
        Self {
            client,
            config,
            lookback_hours,
        }
    }

    /// Search qualifier restricting results to repositories pushed after `since`.
    fn search_query(keyword: &str, since: NaiveDate) -> String {
        format!("{keyword} pushed:>{}", since.format("%Y-%m-%d"))
    }

    fn since(&self, now: DateTime<Utc>) -> NaiveDate {
        (now - Duration::hours(i64::from(self.lookback_hours))).date_naive()
    }

    /// Map one search record to an item; records missing a name or url are dropped.
    fn normalize(record: RepoRecord) -> Option<DigestItem> {
        let date = record.pushed_at.or(record.updated_at).map(|d| d.date_naive());

        match DigestItem::new(Category::Repository, &record.full_name, &record.html_url) {
            Ok(item) => Some(
                item.with_identity(&record.full_name)
                    .with_summary(record.description.as_deref())
                    .with_metric(Some(record.stargazers_count))
                    .with_date(date),
            ),
            Err(e) => {
                debug!(provider = PROVIDER, error = %e, "Skipping malformed repository record");
                None
            }
        }
    }

    fn fail(keyword: &str, cause: SourceFailure) -> SourceError {
        SourceError::new(PROVIDER, keyword, cause)
    }
}

#[async_trait]
impl SourceAdapter for GitHubSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn category(&self) -> Category {
        Category::Repository
    }

    async fn fetch(&self, keyword: &str, limit: usize) -> Result<Vec<DigestItem>, SourceError> {
        let query = Self::search_query(keyword, self.since(Utc::now()));
        let url = format!(
            "{}/search/repositories",
            self.config.api_base.trim_end_matches('/')
        );

        let per_page = limit.to_string();

        debug!(provider = PROVIDER, keyword, query = %query, "Searching repositories");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "updated"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::fail(keyword, e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = PROVIDER, keyword, status = %status, "Search request failed");
            return Err(Self::fail(
                keyword,
                SourceFailure::Status {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::fail(keyword, e.into()))?;

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| Self::fail(keyword, SourceFailure::Parse(e.to_string())))?;

        if parsed.incomplete_results {
            debug!(provider = PROVIDER, keyword, "Search returned incomplete results");
        }

        let items: Vec<DigestItem> = parsed
            .items
            .into_iter()
            .take(limit)
            .filter_map(Self::normalize)
            .collect();

        debug!(provider = PROVIDER, keyword, count = items.len(), "Fetched repositories");

        Ok(items)
    }
}

// =============================================================================
// GitHub API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    incomplete_results: bool,
    #[serde(default)]
    items: Vec<RepoRecord>,
}

#[derive(Debug, Deserialize)]
struct RepoRecord {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}
