//! Daily digest builder.
//!
//! This crate provides:
//! - Source adapters for GitHub repository search and the arXiv Atom feed
//! - Concurrent aggregation with cross-source deduplication
//! - HTML and markdown rendering from a single code path
//! - Dispatch through one configured channel with local fallback output

pub mod aggregator;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod sources;

// Re-export main types
pub use aggregator::{Aggregation, Aggregator};
pub use config::{DigestConfig, Overrides};
pub use dispatch::{DispatchOutcome, DispatchResult, Dispatcher};
pub use error::{ConfigError, DispatchError, SourceError, SourceFailure};
pub use model::{Category, DigestItem, Fingerprint, ItemSet};
pub use pipeline::{Pipeline, RunSummary};
pub use render::{Digest, Renderer};
pub use sources::SourceAdapter;
