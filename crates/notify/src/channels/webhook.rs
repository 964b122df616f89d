//! Slack-compatible incoming webhook channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::http_client;
use crate::config::WebhookCredentials;
use crate::error::ChannelError;
use crate::message::Message;
use crate::NotifyChannel;

/// Accent color of the attachment bar.
const ATTACHMENT_COLOR: &str = "#3498db";

/// Incoming webhook channel.
pub struct WebhookChannel {
    credentials: WebhookCredentials,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a webhook channel for the given URL.
    #[must_use]
    pub fn new(credentials: WebhookCredentials) -> Self {
        Self {
            credentials,
            client: http_client(),
        }
    }

    /// Format a message as a webhook payload.
    fn format_payload(message: &Message) -> WebhookPayload {
        let attachment = WebhookAttachment {
            fallback: message.subject.clone(),
            color: ATTACHMENT_COLOR.to_string(),
            author_name: Some("Daily Digest".to_string()),
            title: message.subject.clone(),
            text: message.body.clone(),
            mrkdwn_in: vec!["text"],
            footer: Some(format!(
                "{} | {}",
                message.format,
                message.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            ts: Some(message.timestamp.timestamp()),
        };

        WebhookPayload {
            text: message.subject.clone(),
            attachments: vec![attachment],
        }
    }
}

#[async_trait]
impl NotifyChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn enabled(&self) -> bool {
        !self.credentials.url.is_empty()
    }

    async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured("DIGEST_WEBHOOK_URL".to_string()));
        }

        let payload = Self::format_payload(message);

        debug!(channel = "webhook", subject = %message.subject, "Sending message");

        let response = self
            .client
            .post(&self.credentials.url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            debug!(channel = "webhook", "Message sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "webhook",
                status = %status,
                body = %body,
                "Webhook request failed"
            );

            Err(ChannelError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// =============================================================================
// Webhook API types
// =============================================================================

#[derive(Debug, Serialize)]
struct WebhookPayload {
    text: String,
    attachments: Vec<WebhookAttachment>,
}

#[derive(Debug, Serialize)]
struct WebhookAttachment {
    fallback: String,
    color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_name: Option<String>,
    title: String,
    text: String,
    mrkdwn_in: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<i64>,
}
