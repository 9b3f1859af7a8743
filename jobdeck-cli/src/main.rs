//! Jobdeck CLI
//!
//! Command-line interface for triggering CI jobs and following their results.

mod commands;
mod display;
mod params;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use jobdeck_engine::{Config, Session};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jobdeck")]
#[command(about = "Jobdeck CI job client", long_about = None)]
struct Cli {
    /// CI engine URL [env: JOBDECK_API_URL]
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds between result polls when watching [env: JOBDECK_POLL_INTERVAL]
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Request timeout in seconds [env: JOBDECK_REQUEST_TIMEOUT]
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;

        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jobdeck_cli=info,jobdeck_engine=info,jobdeck_client=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    tracing::debug!("Using CI engine at {}", config.api_url);

    let session = Session::connect(config).context("Failed to set up the CI engine client")?;
    let outcome = handle_command(cli.command, &session).await;
    session.shutdown();
    outcome
}
