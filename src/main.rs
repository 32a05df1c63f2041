//! # Overhead CLI
//!
//! Commands:
//!
//! | Command | Description |
//! |---------|-------------|
//! | `overhead init` | Create the SQLite database and run schema migrations |
//! | `overhead once` | Run a single poll cycle and exit |
//! | `overhead run`  | Run the poll loop until interrupted |
//!
//! All commands accept a `--config` flag pointing to a TOML configuration
//! file; every setting has a default, so a minimal file is enough.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use overhead::config::{self, Config};
use overhead::cycle;
use overhead::db;
use overhead::migrate;
use overhead::sink::HttpDisplaySink;
use overhead::source::HttpReportSource;
use overhead::store::sqlite::SqliteStore;

/// Overhead — closest-aircraft display feeder for ADS-B receivers.
#[derive(Parser)]
#[command(
    name = "overhead",
    about = "Closest-aircraft display feeder for ADS-B receivers",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/overhead.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (flight_cache, missed_idents, sightings). Idempotent.
    Init,

    /// Run a single poll cycle and exit.
    ///
    /// Fetches the current report batch, selects the closest aircraft,
    /// and delivers one payload. Useful for cron setups and smoke tests.
    Once,

    /// Run the poll loop until interrupted.
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg.db).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Once => {
            let (source, store, sink) = build_adapters(&cfg).await?;
            let outcome = cycle::run_cycle(&source, &store, &sink, &cfg).await?;
            info!(
                ident = outcome.ident.as_deref(),
                distance_km = outcome.distance_km,
                delivered = outcome.delivered,
                "cycle complete"
            );
        }
        Commands::Run => {
            info!("starting display feeder");
            info!(url = %cfg.source.url, "aircraft source");
            info!(url = %cfg.display.url, "display endpoint");
            info!(interval_secs = cfg.poll.interval_secs, "poll period");

            let (source, store, sink) = build_adapters(&cfg).await?;
            cycle::run_loop(&source, &store, &sink, &cfg).await;
        }
    }

    Ok(())
}

/// Connect the store (running migrations so a fresh deployment works
/// without a separate `init`) and build the HTTP adapters.
async fn build_adapters(cfg: &Config) -> Result<(HttpReportSource, SqliteStore, HttpDisplaySink)> {
    let pool = db::connect(&cfg.db).await?;
    migrate::run_migrations(&pool).await?;

    let source = HttpReportSource::new(
        &cfg.source.url,
        Duration::from_secs(cfg.source.timeout_secs),
    )?;
    let sink = HttpDisplaySink::new(
        &cfg.display.url,
        Duration::from_secs(cfg.display.timeout_secs),
    )?;

    Ok((source, SqliteStore::new(pool), sink))
}
