use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stashworth::clock::{Clock, SystemClock};
use stashworth::config::{default_config_path, session_from_env, ResolvedConfig};
use stashworth::league::LeagueKey;
use stashworth::rates::providers::NinjaRateSource;
use stashworth::report::{RefreshOutcome, ReportService};
use stashworth::stash::providers::StashApiSource;
use stashworth::storage::JsonFileStore;

#[derive(Parser)]
#[command(name = "stashworth")]
#[command(about = "Stash tab net worth reports")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the resolved configuration
    Config,
    /// Refresh and print the price table for a league
    Rates { league: String },
    /// Refresh a report and print its snapshot and holdings
    Report { name: String },
    /// Print a report's stored history
    History { name: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn build_service(config: &ResolvedConfig) -> Result<ReportService> {
    if config.account.is_empty() {
        anyhow::bail!("`account` must be set in the config file");
    }
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rates = NinjaRateSource::new()
        .with_base_url(&config.api.ninja_base_url)
        .with_user_agent(&config.api.user_agent);
    let stash = StashApiSource::new(&config.account, session_from_env()?)
        .with_base_url(&config.api.stash_base_url)
        .with_user_agent(&config.api.user_agent);
    let store = JsonFileStore::new(&config.data_dir, clock.clone());

    Ok(ReportService::new(
        &config.account,
        Arc::new(rates),
        Arc::new(stash),
        Arc::new(store),
    )
    .with_clock(clock)
    .with_refresh_config(config.refresh.clone())
    .with_display(config.display.value_format()))
}

#[derive(Serialize)]
struct ReportOutput<T: Serialize, H: Serialize> {
    report: String,
    outcome: T,
    holdings: H,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .json(),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    match cli.command {
        Command::Config => print_json(&config)?,
        Command::Rates { league } => {
            let service = build_service(&config)?;
            let rates = service.refresh_rates(&LeagueKey::new(&league)).await?;
            print_json(&rates)?;
        }
        Command::Report { name } => {
            let report = config
                .report(&name)
                .with_context(|| format!("No report named {name:?} in config"))?;
            let service = build_service(&config)?;
            let outcome = service.refresh_report(report).await?;
            if let RefreshOutcome::AlreadyRunning = outcome {
                tracing::info!(report = %name, "refresh skipped");
            }
            let holdings = service.holdings(report).await?;
            print_json(&ReportOutput {
                report: name,
                outcome,
                holdings,
            })?;
        }
        Command::History { name } => {
            let report = config
                .report(&name)
                .with_context(|| format!("No report named {name:?} in config"))?;
            let service = build_service(&config)?;
            print_json(&service.history(report).await?)?;
        }
    }

    Ok(())
}
