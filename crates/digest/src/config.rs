//! Run configuration.
//!
//! Everything is read from the environment exactly once, at startup, and
//! passed down explicitly. Absent channel credentials are fine (the run
//! falls back to local output); malformed values are a [`ConfigError`].

use notify::{ChannelConfig, ContentFormat, Provider};

use crate::error::ConfigError;
use crate::sources::arxiv::DEFAULT_ARXIV_API_BASE;
use crate::sources::github::DEFAULT_GITHUB_API_BASE;

/// Topics queried on every source, in output order.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "electricity forecasting",
    "load forecasting",
    "time series forecasting",
];

/// Items kept per (provider, keyword) pair.
pub const DEFAULT_PER_KEYWORD_LIMIT: usize = 3;

/// How far back "recent" reaches.
pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;

/// Concurrent fetches in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

const ENV_FORMAT: &str = "DIGEST_FORMAT";
const ENV_LOOKBACK_HOURS: &str = "DIGEST_LOOKBACK_HOURS";
const ENV_CONCURRENCY: &str = "DIGEST_CONCURRENCY";
const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";
const ENV_ARXIV_API_URL: &str = "ARXIV_API_URL";

/// GitHub search settings.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// REST API base URL.
    pub api_base: String,
    /// Optional token; lifts the anonymous rate limit.
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            token: None,
        }
    }
}

/// arXiv query settings.
#[derive(Debug, Clone)]
pub struct ArxivConfig {
    /// Export API base URL.
    pub api_base: String,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_ARXIV_API_BASE.to_string(),
        }
    }
}

/// Command-line overrides applied on top of the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    /// Force a channel (`none` disables delivery).
    pub channel: Option<Provider>,
    /// Force a markup flavor.
    pub format: Option<ContentFormat>,
}

/// Full configuration for one run.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Keywords, in output order.
    pub keywords: Vec<String>,
    /// Items kept per (provider, keyword) pair.
    pub per_keyword_limit: usize,
    /// Recency window for sources that filter by date.
    pub lookback_hours: u32,
    /// Max concurrent fetches.
    pub concurrency: usize,
    /// Explicit markup flavor; `None` picks the channel's default.
    pub format: Option<ContentFormat>,
    /// GitHub settings.
    pub github: GitHubConfig,
    /// arXiv settings.
    pub arxiv: ArxivConfig,
    /// Delivery channel.
    pub channel: ChannelConfig,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect(),
            per_keyword_limit: DEFAULT_PER_KEYWORD_LIMIT,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            concurrency: DEFAULT_CONCURRENCY,
            format: None,
            github: GitHubConfig::default(),
            arxiv: ArxivConfig::default(),
            channel: ChannelConfig::none(),
        }
    }
}

impl DigestConfig {
    /// Create configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `DIGEST_FORMAT`: `html` or `markdown`
    /// - `DIGEST_LOOKBACK_HOURS`: recency window (default: 24)
    /// - `DIGEST_CONCURRENCY`: concurrent fetches (default: 4)
    /// - `GITHUB_TOKEN`, `GITHUB_API_URL`, `ARXIV_API_URL`
    /// - channel variables, see [`ChannelConfig::from_env`]
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let format = match overrides.format {
            Some(format) => Some(format),
            None => get(ENV_FORMAT)
                .map(|raw| {
                    ContentFormat::parse(&raw)
                        .ok_or_else(|| ConfigError::invalid(ENV_FORMAT, &raw, "expected html or markdown"))
                })
                .transpose()?,
        };

        let lookback_hours = parse_positive(ENV_LOOKBACK_HOURS, get(ENV_LOOKBACK_HOURS))?
            .unwrap_or(DEFAULT_LOOKBACK_HOURS);

        let concurrency = parse_positive::<usize>(ENV_CONCURRENCY, get(ENV_CONCURRENCY))?
            .unwrap_or(DEFAULT_CONCURRENCY);

        let github = GitHubConfig {
            api_base: get(ENV_GITHUB_API_URL).unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
            token: get(ENV_GITHUB_TOKEN),
        };

        let arxiv = ArxivConfig {
            api_base: get(ENV_ARXIV_API_URL).unwrap_or_else(|| DEFAULT_ARXIV_API_BASE.to_string()),
        };

        let channel = ChannelConfig::from_lookup(&lookup, overrides.channel)?;

        Ok(Self {
            format,
            lookback_hours,
            concurrency,
            github,
            arxiv,
            channel,
            ..Self::default()
        })
    }

    /// Markup flavor for this run.
    ///
    /// Webhooks render markdown; push and email default to HTML.
    #[must_use]
    pub fn effective_format(&self) -> ContentFormat {
        self.format.unwrap_or(match self.channel.provider {
            Provider::Webhook => ContentFormat::Markdown,
            Provider::Push | Provider::Email | Provider::None => ContentFormat::Html,
        })
    }
}

fn parse_positive<T>(key: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(Some(value)),
        _ => Err(ConfigError::invalid(key, &raw, "expected a positive integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DigestConfig::from_lookup(lookup(&[]), Overrides::default()).unwrap();

        assert_eq!(config.keywords, DEFAULT_KEYWORDS);
        assert_eq!(config.per_keyword_limit, 3);
        assert_eq!(config.lookback_hours, 24);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.github.api_base, DEFAULT_GITHUB_API_BASE);
        assert!(config.github.token.is_none());
        assert!(!config.channel.is_configured());
        assert_eq!(config.effective_format(), ContentFormat::Html);
    }

    #[test]
    fn test_webhook_defaults_to_markdown() {
        let config = DigestConfig::from_lookup(
            lookup(&[("DIGEST_WEBHOOK_URL", "https://hooks.example/x")]),
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.channel.provider, Provider::Webhook);
        assert_eq!(config.effective_format(), ContentFormat::Markdown);
    }

    #[test]
    fn test_format_override_wins() {
        let config = DigestConfig::from_lookup(
            lookup(&[("DIGEST_FORMAT", "html")]),
            Overrides {
                channel: None,
                format: Some(ContentFormat::Markdown),
            },
        )
        .unwrap();
        assert_eq!(config.effective_format(), ContentFormat::Markdown);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let err = DigestConfig::from_lookup(
            lookup(&[("DIGEST_CONCURRENCY", "0")]),
            Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "DIGEST_CONCURRENCY"));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let err = DigestConfig::from_lookup(lookup(&[("DIGEST_FORMAT", "pdf")]), Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_unknown_channel_is_config_error() {
        let err = DigestConfig::from_lookup(
            lookup(&[("DIGEST_CHANNEL", "carrier-pigeon")]),
            Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Channel(_)));
    }

    #[test]
    fn test_reads_source_settings() {
        let config = DigestConfig::from_lookup(
            lookup(&[
                ("GITHUB_TOKEN", "ghp_x"),
                ("GITHUB_API_URL", "http://localhost:9000"),
                ("ARXIV_API_URL", "http://localhost:9001"),
                ("DIGEST_LOOKBACK_HOURS", "48"),
            ]),
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.github.token.as_deref(), Some("ghp_x"));
        assert_eq!(config.github.api_base, "http://localhost:9000");
        assert_eq!(config.arxiv.api_base, "http://localhost:9001");
        assert_eq!(config.lookback_hours, 48);
    }
}
