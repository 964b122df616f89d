//! Dispatcher: hands the rendered digest to the one configured channel.
//!
//! Dispatch never fails the run. An unconfigured channel is skipped without
//! any network I/O, and both skipped and failed deliveries write the full
//! digest to a local fallback sink so nothing is lost silently.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use notify::{ChannelConfig, NotifyChannel};
use tracing::{error, info, warn};

use crate::error::DispatchError;
use crate::render::Digest;

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Provider confirmed delivery
    Delivered,
    /// No channel configured; nothing was sent
    Skipped,
    /// The single delivery attempt failed
    Failed,
}

impl DispatchOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the digest.
#[derive(Debug)]
pub struct DispatchResult {
    /// Channel that was attempted, if any.
    pub channel: Option<&'static str>,
    /// Terminal state.
    pub outcome: DispatchOutcome,
    /// Cause, when `outcome` is [`DispatchOutcome::Failed`].
    pub error: Option<DispatchError>,
}

impl DispatchResult {
    /// Whether the provider confirmed delivery.
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.outcome == DispatchOutcome::Delivered
    }
}

/// Sends a digest through at most one channel.
pub struct Dispatcher {
    channel: Option<Arc<dyn NotifyChannel>>,
}

impl Dispatcher {
    /// Create a dispatcher around an already-built channel (or none).
    #[must_use]
    pub fn new(channel: Option<Arc<dyn NotifyChannel>>) -> Self {
        Self { channel }
    }

    /// Build the channel described by `config`.
    #[must_use]
    pub fn from_config(config: &ChannelConfig) -> Self {
        if !config.is_configured() {
            info!(provider = %config.provider, "No delivery channel configured");
        }
        Self::new(config.build_channel())
    }

    /// Deliver `digest`, writing it to `fallback` unless delivery succeeds.
    pub async fn dispatch(&self, digest: &Digest, fallback: &mut (dyn Write + Send)) -> DispatchResult {
        let channel = match &self.channel {
            Some(channel) if channel.enabled() => channel,
            Some(channel) => {
                warn!(channel = channel.name(), "Channel disabled, skipping delivery");
                write_fallback(digest, fallback);
                return DispatchResult {
                    channel: Some(channel.name()),
                    outcome: DispatchOutcome::Skipped,
                    error: None,
                };
            }
            None => {
                info!("Delivery skipped, writing digest to local output");
                write_fallback(digest, fallback);
                return DispatchResult {
                    channel: None,
                    outcome: DispatchOutcome::Skipped,
                    error: None,
                };
            }
        };

        let name = channel.name();
        info!(channel = name, subject = %digest.subject, items = digest.item_count, "Sending digest");

        match channel.send(&digest.to_message()).await {
            Ok(()) => {
                info!(channel = name, "Digest delivered");
                DispatchResult {
                    channel: Some(name),
                    outcome: DispatchOutcome::Delivered,
                    error: None,
                }
            }
            Err(e) => {
                error!(channel = name, error = %e, "Delivery failed, writing digest to local output");
                write_fallback(digest, fallback);
                DispatchResult {
                    channel: Some(name),
                    outcome: DispatchOutcome::Failed,
                    error: Some(DispatchError {
                        channel: name.to_string(),
                        source: e,
                    }),
                }
            }
        }
    }
}

fn write_fallback(digest: &Digest, out: &mut (dyn Write + Send)) {
    let result = writeln!(out, "{}", digest.subject)
        .and_then(|()| writeln!(out))
        .and_then(|()| writeln!(out, "{}", digest.body))
        .and_then(|()| out.flush());
    if let Err(e) = result {
        warn!(error = %e, "Failed to write digest to local output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use notify::{ChannelError, ContentFormat, Message};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every message it receives; optionally fails.
    struct FakeChannel {
        enabled: bool,
        fail: bool,
        calls: AtomicUsize,
        last: Mutex<Option<Message>>,
    }

    impl FakeChannel {
        fn new(enabled: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                enabled,
                fail,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl NotifyChannel for FakeChannel {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn send(&self, message: &Message) -> Result<(), ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(message.clone());
            if self.fail {
                Err(ChannelError::Rejected {
                    code: 1001,
                    message: "token invalid".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn digest() -> Digest {
        Digest {
            subject: "⚡ Daily Digest (2026-10-19)".to_string(),
            body: "# body\n".to_string(),
            format: ContentFormat::Markdown,
            item_count: 1,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_is_skipped_with_fallback() {
        let dispatcher = Dispatcher::from_config(&ChannelConfig::none());
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&digest(), &mut out).await;

        assert_eq!(result.outcome, DispatchOutcome::Skipped);
        assert!(!result.delivered());
        assert!(result.error.is_none());
        assert_eq!(result.channel, None);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("⚡ Daily Digest (2026-10-19)"));
        assert!(printed.contains("# body"));
    }

    #[tokio::test]
    async fn test_disabled_channel_is_never_called() {
        let channel = FakeChannel::new(false, false);
        let dispatcher = Dispatcher::new(Some(channel.clone() as Arc<dyn NotifyChannel>));
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&digest(), &mut out).await;

        assert_eq!(result.outcome, DispatchOutcome::Skipped);
        assert_eq!(channel.calls.load(Ordering::SeqCst), 0);
        assert!(!out.is_empty());
    }

    #[tokio::test]
    async fn test_delivered_writes_nothing_locally() {
        let channel = FakeChannel::new(true, false);
        let dispatcher = Dispatcher::new(Some(channel.clone() as Arc<dyn NotifyChannel>));
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&digest(), &mut out).await;

        assert!(result.delivered());
        assert_eq!(result.channel, Some("fake"));
        assert_eq!(channel.calls.load(Ordering::SeqCst), 1);
        assert!(out.is_empty());

        let sent = channel.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.subject, "⚡ Daily Digest (2026-10-19)");
        assert_eq!(sent.format, ContentFormat::Markdown);
    }

    #[tokio::test]
    async fn test_failure_is_reported_once_with_fallback() {
        let channel = FakeChannel::new(true, true);
        let dispatcher = Dispatcher::new(Some(channel.clone() as Arc<dyn NotifyChannel>));
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&digest(), &mut out).await;

        assert_eq!(result.outcome, DispatchOutcome::Failed);
        assert!(!result.delivered());
        assert_eq!(channel.calls.load(Ordering::SeqCst), 1);
        let err = result.error.unwrap();
        assert_eq!(err.channel, "fake");
        assert!(err.to_string().contains("token invalid"));
        assert!(String::from_utf8(out).unwrap().contains("# body"));
    }
}
