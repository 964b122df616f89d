//! Channel selection and credentials.
//!
//! The active channel is chosen once at startup. Missing credentials are not
//! an error: the resulting [`ChannelConfig`] is simply unconfigured and the
//! caller falls back to local output. Only malformed values fail.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::channels::{EmailChannel, PushChannel, WebhookChannel};
use crate::error::ChannelError;
use crate::NotifyChannel;

/// Environment variable selecting the channel.
pub const ENV_CHANNEL: &str = "DIGEST_CHANNEL";

const ENV_XP_TOKEN: &str = "XP_TOKEN";
const ENV_XP_UID: &str = "XP_UID";
const ENV_WXPUSHER_API_URL: &str = "WXPUSHER_API_URL";
const ENV_WEBHOOK_URL: &str = "DIGEST_WEBHOOK_URL";
const ENV_SMTP_HOST: &str = "SMTP_HOST";
const ENV_SMTP_PORT: &str = "SMTP_PORT";
const ENV_SMTP_USERNAME: &str = "SMTP_USERNAME";
const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";
const ENV_TO_EMAIL: &str = "DIGEST_TO_EMAIL";
const ENV_FROM_EMAIL: &str = "DIGEST_FROM_EMAIL";

/// Default WxPusher API base.
pub const DEFAULT_PUSH_API_BASE: &str = "https://wxpusher.zjiecode.com";

/// Default Gmail SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Delivery provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Push-notification HTTP API (WxPusher)
    Push,
    /// Incoming webhook (Slack-compatible)
    Webhook,
    /// SMTP email
    Email,
    /// No delivery; local output only
    None,
}

impl Provider {
    /// Parse a provider name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "push" | "wxpusher" => Some(Self::Push),
            "webhook" | "slack" => Some(Self::Webhook),
            "email" | "smtp" => Some(Self::Email),
            "none" | "stdout" | "" => Some(Self::None),
            _ => None,
        }
    }

    /// Get the lowercase name for this provider.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Webhook => "webhook",
            Self::Email => "email",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials for the push API.
#[derive(Clone)]
pub struct PushCredentials {
    /// Application token.
    pub app_token: String,
    /// Recipient user id.
    pub uid: String,
    /// API base URL.
    pub api_base: String,
}

/// Credentials for an incoming webhook.
#[derive(Clone)]
pub struct WebhookCredentials {
    /// Full webhook URL (the URL itself is the secret).
    pub url: String,
}

/// SMTP settings.
#[derive(Clone)]
pub struct SmtpCredentials {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password (app password for Gmail).
    pub password: String,
    /// Sender address.
    pub from_email: String,
    /// Recipient address.
    pub to_email: String,
}

/// Opaque secret bundle for the selected provider.
#[derive(Clone)]
pub enum Credentials {
    Push(PushCredentials),
    Webhook(WebhookCredentials),
    Email(SmtpCredentials),
}

// Secrets never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(c) => f
                .debug_struct("Push")
                .field("api_base", &c.api_base)
                .field("uid", &c.uid)
                .finish_non_exhaustive(),
            Self::Webhook(_) => f.debug_struct("Webhook").finish_non_exhaustive(),
            Self::Email(c) => f
                .debug_struct("Email")
                .field("host", &c.host)
                .field("port", &c.port)
                .field("to_email", &c.to_email)
                .finish_non_exhaustive(),
        }
    }
}

/// Selected delivery channel and its credentials.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Requested provider.
    pub provider: Provider,
    /// Credentials, `None` when the provider's secrets are absent.
    pub credentials: Option<Credentials>,
}

impl ChannelConfig {
    /// A config that never delivers.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            provider: Provider::None,
            credentials: None,
        }
    }

    /// Load from the process environment.
    ///
    /// # Environment Variables
    /// - `DIGEST_CHANNEL`: `push`, `webhook`, `email` or `none`; when unset the
    ///   first provider with complete credentials is used
    /// - `XP_TOKEN`, `XP_UID`, `WXPUSHER_API_URL`: push channel
    /// - `DIGEST_WEBHOOK_URL`: webhook channel
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
    ///   `DIGEST_TO_EMAIL`, `DIGEST_FROM_EMAIL`: email channel
    pub fn from_env(provider_override: Option<Provider>) -> Result<Self, ChannelError> {
        Self::from_lookup(|key| std::env::var(key).ok(), provider_override)
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, provider_override: Option<Provider>) -> Result<Self, ChannelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let requested = match provider_override {
            Some(p) => Some(p),
            None => match get(ENV_CHANNEL) {
                Some(raw) => Some(Provider::parse(&raw).ok_or_else(|| {
                    ChannelError::InvalidConfig(format!("{ENV_CHANNEL}={raw} is not a known channel"))
                })?),
                None => None,
            },
        };

        let push = || -> Option<Credentials> {
            Some(Credentials::Push(PushCredentials {
                app_token: get(ENV_XP_TOKEN)?,
                uid: get(ENV_XP_UID)?,
                api_base: get(ENV_WXPUSHER_API_URL)
                    .unwrap_or_else(|| DEFAULT_PUSH_API_BASE.to_string()),
            }))
        };

        let webhook = || -> Option<Credentials> {
            Some(Credentials::Webhook(WebhookCredentials {
                url: get(ENV_WEBHOOK_URL)?,
            }))
        };

        let email = || -> Result<Option<Credentials>, ChannelError> {
            let (Some(username), Some(password)) = (get(ENV_SMTP_USERNAME), get(ENV_SMTP_PASSWORD))
            else {
                return Ok(None);
            };
            let port = match get(ENV_SMTP_PORT) {
                Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                    ChannelError::InvalidConfig(format!("{ENV_SMTP_PORT}={raw} is not a valid port"))
                })?,
                None => DEFAULT_SMTP_PORT,
            };
            Ok(Some(Credentials::Email(SmtpCredentials {
                host: get(ENV_SMTP_HOST).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port,
                to_email: get(ENV_TO_EMAIL).unwrap_or_else(|| username.clone()),
                from_email: get(ENV_FROM_EMAIL).unwrap_or_else(|| username.clone()),
                username,
                password,
            })))
        };

        let config = match requested {
            Some(Provider::None) => Self::none(),
            Some(Provider::Push) => Self {
                provider: Provider::Push,
                credentials: push(),
            },
            Some(Provider::Webhook) => Self {
                provider: Provider::Webhook,
                credentials: webhook(),
            },
            Some(Provider::Email) => Self {
                provider: Provider::Email,
                credentials: email()?,
            },
            None => {
                if let Some(credentials) = push() {
                    Self {
                        provider: Provider::Push,
                        credentials: Some(credentials),
                    }
                } else if let Some(credentials) = webhook() {
                    Self {
                        provider: Provider::Webhook,
                        credentials: Some(credentials),
                    }
                } else if let Some(credentials) = email()? {
                    Self {
                        provider: Provider::Email,
                        credentials: Some(credentials),
                    }
                } else {
                    debug!("No channel credentials found");
                    Self::none()
                }
            }
        };

        if config.provider != Provider::None && config.credentials.is_none() {
            warn!(
                provider = %config.provider,
                "Channel selected but credentials are missing"
            );
        }

        Ok(config)
    }

    /// Whether a delivery attempt can be made.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider != Provider::None && self.credentials.is_some()
    }

    /// Build the channel for this config, or `None` when unconfigured.
    #[must_use]
    pub fn build_channel(&self) -> Option<Arc<dyn NotifyChannel>> {
        if self.provider == Provider::None {
            return None;
        }
        let channel: Arc<dyn NotifyChannel> = match self.credentials.clone()? {
            Credentials::Push(c) => Arc::new(PushChannel::new(c)),
            Credentials::Webhook(c) => Arc::new(WebhookChannel::new(c)),
            Credentials::Email(c) => Arc::new(EmailChannel::new(c)),
        };
        Some(channel)
    }
}
