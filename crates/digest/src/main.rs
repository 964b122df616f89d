//! Daily digest CLI - builds and delivers the scheduled digest.

use std::io;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daily_digest::dispatch::DispatchOutcome;
use daily_digest::{DigestConfig, Overrides, Pipeline, RunSummary};
use notify::{ContentFormat, Provider};

/// Daily digest - recent repositories and papers for a fixed set of topics.
#[derive(Parser)]
#[command(name = "daily-digest")]
#[command(about = "Build and deliver the daily repository/paper digest")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate, render, and deliver the digest (default; for cron use)
    Run {
        /// Delivery channel (push, webhook, email, none)
        #[arg(long, value_parser = parse_provider)]
        channel: Option<Provider>,

        /// Output format (html, markdown)
        #[arg(long, value_parser = parse_format)]
        format: Option<ContentFormat>,

        /// Render and print, never deliver
        #[arg(long)]
        dry_run: bool,
    },

    /// Aggregate and render, printing the digest to stdout
    Preview {
        /// Output format (html, markdown)
        #[arg(long, value_parser = parse_format)]
        format: Option<ContentFormat>,
    },

    /// Send a short test digest through the configured channel
    TestChannel {
        /// Delivery channel (push, webhook, email)
        #[arg(long, value_parser = parse_provider)]
        channel: Option<Provider>,
    },
}

fn parse_provider(s: &str) -> Result<Provider, String> {
    Provider::parse(s).ok_or_else(|| format!("unknown channel: {s} (expected push, webhook, email, none)"))
}

fn parse_format(s: &str) -> Result<ContentFormat, String> {
    ContentFormat::parse(s).ok_or_else(|| format!("unknown format: {s} (expected html, markdown)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    let command = cli.command.unwrap_or(Commands::Run {
        channel: None,
        format: None,
        dry_run: false,
    });

    match command {
        Commands::Run {
            channel,
            format,
            dry_run,
        } => run(Overrides { channel, format }, dry_run).await,
        Commands::Preview { format } => {
            run(
                Overrides {
                    channel: None,
                    format,
                },
                true,
            )
            .await
        }
        Commands::TestChannel { channel } => {
            run_test_channel(Overrides {
                channel,
                format: None,
            })
            .await
        }
    }
}

/// Logs go to stderr; stdout is reserved for the digest fallback.
fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("daily_digest=debug,notify=debug,info")
        } else {
            EnvFilter::new("daily_digest=info,notify=info,warn")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}

fn load_config(overrides: Overrides) -> Result<DigestConfig> {
    let config = DigestConfig::from_env(overrides).context("Invalid configuration")?;
    tracing::debug!(
        keywords = ?config.keywords,
        per_keyword_limit = config.per_keyword_limit,
        lookback_hours = config.lookback_hours,
        concurrency = config.concurrency,
        channel = %config.channel.provider,
        format = %config.effective_format(),
        "Loaded configuration"
    );
    Ok(config)
}

async fn run(overrides: Overrides, dry_run: bool) -> Result<()> {
    let config = load_config(overrides)?;
    let pipeline = Pipeline::from_config(&config);
    let as_of = Utc::now().date_naive();

    if dry_run {
        let (digest, summary) = pipeline.preview(as_of).await;
        println!("{}\n", digest.subject);
        println!("{}", digest.body);
        print_summary(&summary);
        return Ok(());
    }

    let summary = pipeline.run(as_of, &mut io::stdout()).await;
    print_summary(&summary);

    // Degraded runs still succeed; only configuration faults change the exit status.
    Ok(())
}

async fn run_test_channel(overrides: Overrides) -> Result<()> {
    let config = load_config(overrides)?;
    if !config.channel.is_configured() {
        anyhow::bail!(
            "No delivery channel configured (provider: {}); set DIGEST_CHANNEL and its credentials",
            config.channel.provider
        );
    }

    let pipeline = Pipeline::from_config(&config);
    let result = pipeline
        .send_test(Utc::now().date_naive(), &mut io::stderr())
        .await;

    match result.outcome {
        DispatchOutcome::Delivered => {
            eprintln!("✅ Test digest delivered via {}", result.channel.unwrap_or("none"));
            Ok(())
        }
        DispatchOutcome::Skipped => {
            anyhow::bail!("Test digest skipped: channel is disabled")
        }
        DispatchOutcome::Failed => match result.error {
            Some(e) => Err(anyhow::Error::new(e).context("Test digest failed")),
            None => anyhow::bail!("Test digest failed"),
        },
    }
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n📊 Digest Summary");
    eprintln!("   Requests: {} ({} failed)", summary.requests, summary.failures);
    eprintln!("   Fetched: {}", summary.fetched);
    eprintln!("   Duplicates: {}", summary.duplicates);
    eprintln!("   Repositories: {}", summary.repositories);
    eprintln!("   Papers: {}", summary.papers);
    eprintln!("   Format: {}", summary.format);
    match summary.outcome {
        Some(outcome) => eprintln!(
            "   Delivery: {outcome} ({})",
            summary.channel.unwrap_or("local output")
        ),
        None => eprintln!("   Delivery: dry run"),
    }
}
