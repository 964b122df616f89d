//! Delivery channels for the daily digest.
//!
//! This crate sends one rendered message through exactly one configured
//! channel: a push-notification API, a Slack-compatible webhook, or SMTP
//! email.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{ChannelConfig, ContentFormat, Message};
//!
//! # async fn run() -> Result<(), notify::ChannelError> {
//! let config = ChannelConfig::from_env(None)?;
//! if let Some(channel) = config.build_channel() {
//!     let message = Message::new("Daily Digest", "<b>hello</b>", ContentFormat::Html);
//!     channel.send(&message).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for delivery channels
//! - [`PushChannel`], [`WebhookChannel`] and [`EmailChannel`] implement it
//! - [`ChannelConfig`] selects one of them from the environment

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod config;
pub mod error;
pub mod message;

pub use channels::{EmailChannel, NotifyChannel, PushChannel, WebhookChannel};
pub use config::{ChannelConfig, Credentials, Provider};
pub use error::ChannelError;
pub use message::{ContentFormat, Message};
