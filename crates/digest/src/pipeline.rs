//! Digest pipeline - orchestrates the aggregate-render-dispatch flow.

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use notify::ContentFormat;

use crate::aggregator::{Aggregation, Aggregator};
use crate::config::DigestConfig;
use crate::dispatch::{DispatchOutcome, DispatchResult, Dispatcher};
use crate::model::{Category, DigestItem, ItemSet};
use crate::render::{Digest, Renderer};
use crate::sources::{default_sources, SourceAdapter};

/// Result of a single run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of (provider, keyword) fetches attempted.
    pub requests: usize,
    /// Number of those that failed.
    pub failures: usize,
    /// Items fetched before dedup.
    pub fetched: usize,
    /// Items dropped as duplicates.
    pub duplicates: usize,
    /// Repositories in the digest.
    pub repositories: usize,
    /// Papers in the digest.
    pub papers: usize,
    /// Markup flavor rendered.
    pub format: ContentFormat,
    /// Channel attempted, if any.
    pub channel: Option<&'static str>,
    /// Delivery outcome; `None` when dispatch was not attempted.
    pub outcome: Option<DispatchOutcome>,
}

impl RunSummary {
    fn from_aggregation(aggregation: &Aggregation, format: ContentFormat) -> Self {
        Self {
            requests: aggregation.requests,
            failures: aggregation.failures.len(),
            fetched: aggregation.fetched,
            duplicates: aggregation.duplicates,
            repositories: aggregation.items.count(Category::Repository),
            papers: aggregation.items.count(Category::Paper),
            format,
            channel: None,
            outcome: None,
        }
    }

    /// Whether the digest reached its channel.
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.outcome == Some(DispatchOutcome::Delivered)
    }
}

/// Digest pipeline orchestrator.
pub struct Pipeline {
    keywords: Vec<String>,
    aggregator: Aggregator,
    renderer: Renderer,
    dispatcher: Dispatcher,
}

impl Pipeline {
    /// Create a pipeline with the default sources and the configured channel.
    #[must_use]
    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(
            config,
            default_sources(config),
            Dispatcher::from_config(&config.channel),
        )
    }

    /// Create a pipeline from explicit parts.
    #[must_use]
    pub fn new(
        config: &DigestConfig,
        sources: Vec<Arc<dyn SourceAdapter>>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            keywords: config.keywords.clone(),
            aggregator: Aggregator::new(sources, config.per_keyword_limit, config.concurrency),
            renderer: Renderer::new(config.effective_format()),
            dispatcher,
        }
    }

    /// Aggregate and render without dispatching.
    pub async fn preview(&self, as_of: NaiveDate) -> (Digest, RunSummary) {
        tracing::info!(keywords = self.keywords.len(), %as_of, "Building digest");

        let aggregation = self.aggregator.aggregate(&self.keywords).await;
        let summary = RunSummary::from_aggregation(&aggregation, self.renderer.format());
        let digest = self.renderer.render(&aggregation.items, as_of);

        tracing::debug!(
            format = %digest.format,
            bytes = digest.body.len(),
            "Rendered digest"
        );

        (digest, summary)
    }

    /// Run the full pipeline.
    ///
    /// Source and delivery failures degrade the digest but never fail the
    /// run; the digest is written to `fallback` whenever it is not delivered.
    pub async fn run(&self, as_of: NaiveDate, fallback: &mut (dyn Write + Send)) -> RunSummary {
        let (digest, mut summary) = self.preview(as_of).await;

        let result = self.dispatcher.dispatch(&digest, fallback).await;
        summary.channel = result.channel;
        summary.outcome = Some(result.outcome);

        tracing::info!(
            requests = summary.requests,
            failures = summary.failures,
            fetched = summary.fetched,
            duplicates = summary.duplicates,
            repositories = summary.repositories,
            papers = summary.papers,
            channel = summary.channel.unwrap_or("none"),
            outcome = %result.outcome,
            "Run complete"
        );

        summary
    }

    /// Send a small fixed digest through the configured channel.
    pub async fn send_test(&self, as_of: NaiveDate, fallback: &mut (dyn Write + Send)) -> DispatchResult {
        let digest = self.renderer.render(&sample_items(), as_of);
        let result = self.dispatcher.dispatch(&digest, fallback).await;

        tracing::info!(
            channel = result.channel.unwrap_or("none"),
            outcome = %result.outcome,
            "Test digest dispatched"
        );

        result
    }
}

/// One item per category, used by [`Pipeline::send_test`].
fn sample_items() -> ItemSet {
    let items = [
        DigestItem::new(
            Category::Repository,
            "daily-digest/test",
            "https://github.com/search?q=load+forecasting",
        )
        .map(|item| {
            item.with_summary(Some("Test message - if you can read this, delivery works."))
                .with_metric(Some(0))
        }),
        DigestItem::new(Category::Paper, "Test paper", "https://arxiv.org/list/cs.LG/recent"),
    ];
    ItemSet::from_items(items.into_iter().filter_map(Result::ok))
}
