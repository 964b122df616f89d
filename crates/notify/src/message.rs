//! Outbound message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Markup flavor of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// HTML fragment
    Html,
    /// Lightweight markdown
    Markdown,
}

impl ContentFormat {
    /// Parse a format name (`html`, `markdown`/`md`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Some(Self::Html),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Get the lowercase name for this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully rendered message, ready to hand to a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// One-line subject / summary.
    pub subject: String,
    /// Rendered body in `format`.
    pub body: String,
    /// Markup flavor of `body`.
    pub format: ContentFormat,
    /// When the message was produced.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>, format: ContentFormat) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            format,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(ContentFormat::parse("HTML"), Some(ContentFormat::Html));
        assert_eq!(ContentFormat::parse(" md "), Some(ContentFormat::Markdown));
        assert_eq!(ContentFormat::parse("markdown"), Some(ContentFormat::Markdown));
        assert_eq!(ContentFormat::parse("rtf"), None);
    }

    #[test]
    fn test_format_display_round_trips_through_parse() {
        for format in [ContentFormat::Html, ContentFormat::Markdown] {
            assert_eq!(ContentFormat::parse(&format.to_string()), Some(format));
        }
    }
}
