//! Aggregator: runs every source for every keyword and folds the results
//! into one deduplicated [`ItemSet`].

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceFailure};
use crate::model::{Category, DigestItem, ItemSet, ItemSetBuilder};
use crate::sources::SourceAdapter;

/// Outcome of one aggregation pass.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Sealed, deduplicated items.
    pub items: ItemSet,
    /// Number of (provider, keyword) fetches attempted.
    pub requests: usize,
    /// Items fetched before dedup.
    pub fetched: usize,
    /// Items dropped as duplicates.
    pub duplicates: usize,
    /// Fetches that failed; each contributed zero items.
    pub failures: Vec<SourceError>,
}

/// Runs the (keyword × source) cross product with bounded concurrency.
pub struct Aggregator {
    sources: Vec<Arc<dyn SourceAdapter>>,
    limit: usize,
    concurrency: usize,
}

impl Aggregator {
    /// Create an aggregator. `limit` and `concurrency` are clamped to at least 1.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>, limit: usize, concurrency: usize) -> Self {
        Self {
            sources,
            limit: limit.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch, dedup, and seal.
    ///
    /// Never fails: a failed fetch is logged, recorded in
    /// [`Aggregation::failures`], and contributes nothing. The set is sealed
    /// only after every fetch has finished.
    pub async fn aggregate(&self, keywords: &[String]) -> Aggregation {
        let limit = self.limit;

        let jobs: Vec<(String, Arc<dyn SourceAdapter>)> = keywords
            .iter()
            .filter(|k| {
                let keep = !k.trim().is_empty();
                if !keep {
                    warn!("Skipping empty keyword");
                }
                keep
            })
            .flat_map(|keyword| {
                self.sources
                    .iter()
                    .map(move |source| (keyword.clone(), Arc::clone(source)))
            })
            .collect();

        let requests = jobs.len();
        info!(
            requests,
            sources = self.sources.len(),
            concurrency = self.concurrency,
            "Starting aggregation"
        );

        // `buffered` keeps input order, so "first occurrence" below follows
        // (keyword, source) order no matter which fetch finishes first.
        let outcomes: Vec<Result<Vec<DigestItem>, SourceError>> = stream::iter(jobs)
            .map(|(keyword, source)| async move {
                let provider = source.name();
                let task_keyword = keyword.clone();
                let handle =
                    tokio::spawn(async move { source.fetch(&task_keyword, limit).await });
                match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(SourceError::new(
                        provider,
                        keyword,
                        SourceFailure::Provider(format!("fetch task aborted: {e}")),
                    )),
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut builder = ItemSetBuilder::new();
        let mut aggregation = Aggregation {
            requests,
            ..Aggregation::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(items) => {
                    for item in items.into_iter().take(limit) {
                        aggregation.fetched += 1;
                        let fingerprint = item.fingerprint().clone();
                        if !builder.insert(item) {
                            debug!(fingerprint = %fingerprint, "Dropping duplicate item");
                            aggregation.duplicates += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        provider = %e.provider,
                        keyword = %e.keyword,
                        error = %e.cause,
                        "Source fetch failed, continuing without it"
                    );
                    aggregation.failures.push(e);
                }
            }
        }

        aggregation.items = builder.seal();

        info!(
            requests,
            failures = aggregation.failures.len(),
            fetched = aggregation.fetched,
            duplicates = aggregation.duplicates,
            repositories = aggregation.items.count(Category::Repository),
            papers = aggregation.items.count(Category::Paper),
            "Aggregation complete"
        );

        aggregation
    }
}
