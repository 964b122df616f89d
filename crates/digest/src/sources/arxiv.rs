//! arXiv Atom feed source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};

use super::SourceAdapter;
use crate::config::ArxivConfig;
use crate::error::{SourceError, SourceFailure};
use crate::model::{truncate_chars, Category, DigestItem};

/// Public arXiv export API.
pub const DEFAULT_ARXIV_API_BASE: &str = "http://export.arxiv.org";

/// Abstracts are cut to this many characters.
const MAX_SUMMARY_CHARS: usize = 280;

const PROVIDER: &str = "arxiv";

/// Queries the newest submissions matching a keyword in any field.
pub struct ArxivSource {
    client: reqwest::Client,
    config: ArxivConfig,
}

impl ArxivSource {
    /// Create a new arXiv source.
    #[must_use]
    pub fn new(client: reqwest::Client, config: ArxivConfig) -> Self {
        Self { client, config }
    }

    /// Parse an Atom document into items, at most `limit` of them.
    fn parse_feed(body: &str, limit: usize) -> Result<Vec<DigestItem>, SourceFailure> {
        let feed: AtomFeed =
            quick_xml::de::from_str(body).map_err(|e| SourceFailure::Parse(e.to_string()))?;

        // The API reports bad queries as a single entry pointing at its error docs.
        if let Some(error) = feed
            .entries
            .iter()
            .find(|e| e.id.as_deref().is_some_and(|id| id.contains("/api/errors")))
        {
            let detail = error
                .summary
                .clone()
                .unwrap_or_else(|| "unknown arXiv API error".to_string());
            return Err(SourceFailure::Provider(detail.trim().to_string()));
        }

        Ok(feed
            .entries
            .into_iter()
            .take(limit)
            .filter_map(Self::normalize)
            .collect())
    }

    fn normalize(entry: AtomEntry) -> Option<DigestItem> {
        let title = entry.title.unwrap_or_default();
        let url = entry.id.unwrap_or_default();
        let date = entry
            .published
            .or(entry.updated)
            .as_deref()
            .and_then(parse_date);
        let summary = entry
            .summary
            .map(|s| truncate_chars(&crate::model::collapse_whitespace(&s), MAX_SUMMARY_CHARS));

        match DigestItem::new(Category::Paper, &title, &url) {
            Ok(item) => Some(item.with_summary(summary.as_deref()).with_date(date)),
            Err(e) => {
                debug!(provider = PROVIDER, error = %e, "Skipping malformed feed entry");
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for ArxivSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn category(&self) -> Category {
        Category::Paper
    }

    async fn fetch(&self, keyword: &str, limit: usize) -> Result<Vec<DigestItem>, SourceError> {
        let url = format!("{}/api/query", self.config.api_base.trim_end_matches('/'));
        let search_query = format!("all:{keyword}");
        let max_results = limit.to_string();

        debug!(provider = PROVIDER, keyword, "Querying papers");

        let fail = |cause: SourceFailure| SourceError::new(PROVIDER, keyword, cause);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|e| fail(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = PROVIDER, keyword, status = %status, "Query failed");
            return Err(fail(SourceFailure::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let body = response.text().await.map_err(|e| fail(e.into()))?;
        let items = Self::parse_feed(&body, limit).map_err(fail)?;

        debug!(provider = PROVIDER, keyword, count = items.len(), "Fetched papers");

        Ok(items)
    }
}

/// Parse an Atom timestamp (`2026-10-17T17:59:59Z`) down to its date.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.date_naive())
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

// =============================================================================
// Atom types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    updated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3Dall%3Aload%20forecasting" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=all:load forecasting</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2026-10-19T00:00:00-04:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1520</opensearch:totalResults>
  <entry>
    <id>http://arxiv.org/abs/2610.01234v1</id>
    <updated>2026-10-17T17:59:59Z</updated>
    <published>2026-10-17T17:59:59Z</published>
    <title>Probabilistic Load
  Forecasting with Diffusion Models</title>
    <summary>  We propose a diffusion model
  for day-ahead load forecasting.
</summary>
    <author>
      <name>A. Researcher</name>
    </author>
    <link href="http://arxiv.org/abs/2610.01234v1" rel="alternate" type="text/html"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2610.05678v2</id>
    <published>2026-10-16T09:00:00Z</published>
    <title>Transformers for Grid Demand</title>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entries() {
        let items = ArxivSource::parse_feed(FEED, 3).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.category(), Category::Paper);
        assert_eq!(first.title(), "Probabilistic Load Forecasting with Diffusion Models");
        assert_eq!(first.url(), "http://arxiv.org/abs/2610.01234v1");
        assert_eq!(
            first.summary(),
            Some("We propose a diffusion model for day-ahead load forecasting.")
        );
        assert_eq!(first.published_or_updated(), NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(first.metric(), None);

        assert_eq!(items[1].summary(), None);
    }

    #[test]
    fn test_parse_feed_respects_limit() {
        let items = ArxivSource::parse_feed(FEED, 1).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_empty_feed() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title></feed>"#;
        assert!(ArxivSource::parse_feed(body, 3).unwrap().is_empty());
    }

    #[test]
    fn test_error_entry_is_provider_failure() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
  </entry>
</feed>"#;
        match ArxivSource::parse_feed(body, 3).unwrap_err() {
            SourceFailure::Provider(detail) => assert_eq!(detail, "incorrect id format for 1234"),
            other => panic!("expected provider failure, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_parse_failure() {
        let err = ArxivSource::parse_feed(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><title>Cut off"#,
            3,
        ).unwrap_err();
        assert!(matches!(err, SourceFailure::Parse(_)));
    }

    #[test]
    fn test_parse_date_fallback() {
        assert_eq!(parse_date("2026-10-17"), NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(parse_date("nonsense"), None);
    }
}
