//! Error taxonomy for the digest pipeline.
//!
//! Only [`ConfigError`] is allowed to reach `main`; source and dispatch
//! errors are folded into degraded-but-continuing behavior by the component
//! that owns them.

use thiserror::Error;

/// Failure of one provider for one keyword.
#[derive(Debug, Error)]
#[error("{provider} failed for keyword {keyword:?}: {cause}")]
pub struct SourceError {
    /// Provider name (`github`, `arxiv`, ...).
    pub provider: String,
    /// Keyword that was being queried.
    pub keyword: String,
    /// What went wrong.
    pub cause: SourceFailure,
}

impl SourceError {
    /// Create a new source error.
    pub fn new(provider: impl Into<String>, keyword: impl Into<String>, cause: SourceFailure) -> Self {
        Self {
            provider: provider.into(),
            keyword: keyword.into(),
            cause,
        }
    }
}

/// Underlying cause of a [`SourceError`].
#[derive(Debug, Error)]
pub enum SourceFailure {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be parsed
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Provider reported an error in an otherwise valid response
    #[error("provider error: {0}")]
    Provider(String),
}

/// Delivery failure for the configured channel.
#[derive(Debug, Error)]
#[error("delivery via {channel} failed: {source}")]
pub struct DispatchError {
    /// Channel name.
    pub channel: String,
    /// Transport-level error from the channel.
    #[source]
    pub source: notify::ChannelError,
}

/// Missing or malformed configuration with no sensible fallback.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is present but cannot be used
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    /// Channel configuration rejected by the delivery layer
    #[error(transparent)]
    Channel(#[from] notify::ChannelError),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_message_names_provider_and_keyword() {
        let err = SourceError::new(
            "arxiv",
            "load forecasting",
            SourceFailure::Status {
                status: 503,
                body: "busy".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "arxiv failed for keyword \"load forecasting\": provider returned 503: busy"
        );
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::invalid("DIGEST_CONCURRENCY", "zero", "expected a positive integer");
        assert_eq!(
            err.to_string(),
            "invalid value for DIGEST_CONCURRENCY: \"zero\" (expected a positive integer)"
        );
    }
}
