//! Error types for the delivery channels.

use thiserror::Error;

/// Errors that can occur when configuring or sending through a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Channel configuration is present but malformed
    #[error("Invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider answered but refused the message
    #[error("Provider rejected message (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// Provider returned a non-success HTTP status
    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Email could not be built or sent
    #[error("SMTP error: {0}")]
    Smtp(String),
}

impl From<lettre::transport::smtp::Error> for ChannelError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Smtp(err.to_string())
    }
}

impl From<lettre::error::Error> for ChannelError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Smtp(err.to_string())
    }
}
