//! Email channel over SMTP (STARTTLS).

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use crate::config::SmtpCredentials;
use crate::error::ChannelError;
use crate::message::{ContentFormat, Message};
use crate::NotifyChannel;

/// Email channel.
pub struct EmailChannel {
    config: SmtpCredentials,
}

impl EmailChannel {
    /// Create a new email channel with the given SMTP settings.
    #[must_use]
    pub const fn new(config: SmtpCredentials) -> Self {
        Self { config }
    }

    /// Build the MIME message for `message`.
    fn build_email(&self, message: &Message) -> Result<lettre::Message, ChannelError> {
        let from: Mailbox = self
            .config
            .from_email
            .parse()
            .map_err(|e| ChannelError::InvalidConfig(format!("Invalid from email address: {e}")))?;

        let to: Mailbox = self
            .config
            .to_email
            .parse()
            .map_err(|e| ChannelError::InvalidConfig(format!("Invalid to email address: {e}")))?;

        let content_type = match message.format {
            ContentFormat::Html => ContentType::TEXT_HTML,
            ContentFormat::Markdown => ContentType::TEXT_PLAIN,
        };

        let email = lettre::Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .singlepart(
                SinglePart::builder()
                    .header(content_type)
                    .body(message.body.clone()),
            )?;

        Ok(email)
    }
}

#[async_trait]
impl NotifyChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        !self.config.username.is_empty() && !self.config.password.is_empty()
    }

    async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured(
                "SMTP_USERNAME/SMTP_PASSWORD".to_string(),
            ));
        }

        let email = self.build_email(message)?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                .port(self.config.port)
                .credentials(creds)
                .build();

        debug!(channel = "email", host = %self.config.host, "Sending message");

        mailer.send(email).await?;

        info!(
            to = %self.config.to_email,
            subject = %message.subject,
            "Email sent successfully"
        );

        Ok(())
    }
}
