//! Delivery channel implementations.

pub mod email;
pub mod push;
pub mod webhook;

pub use email::EmailChannel;
pub use push::PushChannel;
pub use webhook::WebhookChannel;

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ChannelError;
use crate::message::Message;

/// Timeout applied to every outbound HTTP request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for delivery channels (push, webhook, email).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Send a message through this channel.
    ///
    /// `Ok(())` means the provider confirmed delivery by its own definition.
    async fn send(&self, message: &Message) -> Result<(), ChannelError>;
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults without timeout");
            reqwest::Client::new()
        })
}
