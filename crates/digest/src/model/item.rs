//! Normalized digest items and their dedup fingerprint.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::Category;

/// Rejected item construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item title is empty")]
    EmptyTitle,
    #[error("item url is empty")]
    EmptyUrl,
}

/// One dedup key of a [`DigestItem`].
///
/// Every item has a content key built from its normalized title and url.
/// Items with a stable natural key (a repository's full name) carry an
/// identity key as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint from a stable identity within a category.
    #[must_use]
    pub fn identity(category: Category, key: &str) -> Self {
        Self(format!("{category}:{}", key.trim().to_lowercase()))
    }

    /// Fingerprint from normalized content.
    #[must_use]
    pub fn content(title: &str, url: &str) -> Self {
        Self(format!(
            "content:{}|{}",
            collapse_whitespace(title),
            url.trim().trim_end_matches('/')
        ))
    }

    /// The raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One normalized result, ready for rendering.
///
/// Built with [`DigestItem::new`] plus the `with_*` methods; there are no
/// mutators once the value has been handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestItem {
    category: Category,
    title: String,
    url: String,
    summary: Option<String>,
    published_or_updated: Option<NaiveDate>,
    metric: Option<u64>,
    fingerprint: Fingerprint,
    identity: Option<Fingerprint>,
}

impl DigestItem {
    /// Create an item; title and url must be non-empty after trimming.
    pub fn new(
        category: Category,
        title: impl AsRef<str>,
        url: impl AsRef<str>,
    ) -> Result<Self, ItemError> {
        let title = collapse_whitespace(title.as_ref());
        let url = url.as_ref().trim().to_string();

        if title.is_empty() {
            return Err(ItemError::EmptyTitle);
        }
        if url.is_empty() {
            return Err(ItemError::EmptyUrl);
        }

        let fingerprint = Fingerprint::content(&title, &url);
        Ok(Self {
            category,
            title,
            url,
            summary: None,
            published_or_updated: None,
            metric: None,
            fingerprint,
            identity: None,
        })
    }

    /// Also key dedup on a stable identity; the content key still applies.
    #[must_use]
    pub fn with_identity(mut self, key: &str) -> Self {
        self.identity =
            (!key.trim().is_empty()).then(|| Fingerprint::identity(self.category, key));
        self
    }

    /// Attach a summary; blank text is treated as absent.
    #[must_use]
    pub fn with_summary(mut self, summary: Option<&str>) -> Self {
        self.summary = summary
            .map(collapse_whitespace)
            .filter(|s| !s.is_empty());
        self
    }

    /// Attach the publish/update date.
    #[must_use]
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.published_or_updated = date;
        self
    }

    /// Attach a numeric metric (star count, ...).
    #[must_use]
    pub fn with_metric(mut self, metric: Option<u64>) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn published_or_updated(&self) -> Option<NaiveDate> {
        self.published_or_updated
    }

    #[must_use]
    pub fn metric(&self) -> Option<u64> {
        self.metric
    }

    /// Content key (normalized title and url).
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Identity key, when the source has a stable one.
    #[must_use]
    pub fn identity(&self) -> Option<&Fingerprint> {
        self.identity.as_ref()
    }

    /// Every key this item is deduplicated on.
    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        std::iter::once(&self.fingerprint).chain(self.identity.as_ref())
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate text for previews, respecting UTF-8 character boundaries.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    }
}
