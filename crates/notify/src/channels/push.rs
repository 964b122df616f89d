//! WxPusher push-notification channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::http_client;
use crate::config::PushCredentials;
use crate::error::ChannelError;
use crate::message::{ContentFormat, Message};
use crate::NotifyChannel;

/// Response code the API uses for an accepted message.
const SUCCESS_CODE: i64 = 1000;

/// Longest summary the API shows in the notification preview.
const MAX_SUMMARY_CHARS: usize = 100;

/// Push-notification channel.
pub struct PushChannel {
    credentials: PushCredentials,
    client: reqwest::Client,
}

impl PushChannel {
    /// Create a push channel with the given credentials.
    #[must_use]
    pub fn new(credentials: PushCredentials) -> Self {
        Self {
            credentials,
            client: http_client(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/send/message",
            self.credentials.api_base.trim_end_matches('/')
        )
    }

    fn format_payload(&self, message: &Message) -> PushPayload {
        let content_type = match message.format {
            ContentFormat::Html => 2,
            ContentFormat::Markdown => 3,
        };

        PushPayload {
            app_token: self.credentials.app_token.clone(),
            content: message.body.clone(),
            summary: message.subject.chars().take(MAX_SUMMARY_CHARS).collect(),
            content_type,
            uids: vec![self.credentials.uid.clone()],
            verify_pay: false,
        }
    }
}

#[async_trait]
impl NotifyChannel for PushChannel {
    fn name(&self) -> &'static str {
        "push"
    }

    fn enabled(&self) -> bool {
        !self.credentials.app_token.is_empty() && !self.credentials.uid.is_empty()
    }

    async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured("XP_TOKEN/XP_UID".to_string()));
        }

        let payload = self.format_payload(message);

        debug!(channel = "push", subject = %message.subject, "Sending message");

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(channel = "push", status = %status, body = %body, "Push request failed");
            return Err(ChannelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // HTTP 200 alone is not delivery; the body carries the verdict.
        let body = response.text().await?;
        let reply: PushResponse = serde_json::from_str(&body)?;

        if reply.code == SUCCESS_CODE {
            debug!(channel = "push", "Message accepted");
            Ok(())
        } else {
            warn!(
                channel = "push",
                code = reply.code,
                msg = %reply.msg,
                "Push provider rejected message"
            );
            Err(ChannelError::Rejected {
                code: reply.code,
                message: reply.msg,
            })
        }
    }
}

// =============================================================================
// Push API types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushPayload {
    app_token: String,
    content: String,
    summary: String,
    content_type: u8,
    uids: Vec<String>,
    verify_pay: bool,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    code: i64,
    #[serde(default)]
    msg: String,
}
