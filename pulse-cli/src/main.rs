//! Exchange Pulse CLI
//!
//! Continuously polls exchange tickers for a currency pair and prints
//! per-exchange liquidity statistics every cycle.

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pulse_coingecko::CoinGeckoClient;
use pulse_core::{CurrencyPair, ExchangeCatalog};
use pulse_services::{MarketDataProvider, MarketPoller, PollerConfig, SnapshotNormalizer};

#[derive(Parser, Debug)]
#[command(version, about = "Cross-exchange price/volume consistency monitor")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll exchanges for a currency pair and print rolling statistics
    Watch {
        /// Base currency code, exact case as exchanges list it
        #[arg(long, default_value = "BTC")]
        base: String,

        /// Target currency code
        #[arg(long, default_value = "USDT")]
        target: String,

        /// Country filter, case-insensitive substring
        #[arg(long, default_value = "United States")]
        country: String,

        /// Seconds between poll cycles
        #[arg(long, default_value = "60")]
        interval: u64,

        /// Reference zone for trade timestamps, minutes east of UTC
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        utc_offset_minutes: i32,

        /// Write the accumulated observations to this CSV file on exit
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the exchange catalog with countries and 24h volume
    Exchanges,

    /// Print the top assets by market capitalization
    Assets {
        /// Number of assets to list
        #[arg(long, default_value = "25")]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let api_key = std::env::var("COINGECKO_API_KEY")
        .context("COINGECKO_API_KEY is not set; export it or add it to .env")?;
    let client = CoinGeckoClient::with_api_key(api_key);

    match args.command {
        Command::Watch {
            base,
            target,
            country,
            interval,
            utc_offset_minutes,
            export,
        } => {
            watch_pair(
                client,
                CurrencyPair::new(base, target),
                country,
                interval,
                utc_offset_minutes,
                export,
            )
            .await
        }
        Command::Exchanges => list_exchanges(client).await,
        Command::Assets { limit } => list_assets(client, limit).await,
    }
}

async fn watch_pair(
    client: CoinGeckoClient,
    pair: CurrencyPair,
    country: String,
    interval: u64,
    utc_offset_minutes: i32,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let local_zone = FixedOffset::east_opt(utc_offset_minutes * 60)
        .context("UTC offset is out of range")?;

    let config = PollerConfig {
        pair,
        country,
        poll_interval: Duration::from_secs(interval),
    };

    let provider: Arc<dyn MarketDataProvider> = Arc::new(client);
    let mut poller = MarketPoller::new(provider, SnapshotNormalizer::new(local_zone), config);

    // Ctrl-C flips the shutdown flag; the poller stops at the next cycle
    // boundary with the store intact.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    poller.run(shutdown_rx, render::print_cycle).await?;

    if let Some(path) = export {
        let written = render::write_observations_csv(&path, poller.observations())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Exported {} observations to {}", written, path.display());
    }

    Ok(())
}

async fn list_exchanges(client: CoinGeckoClient) -> anyhow::Result<()> {
    let catalog = ExchangeCatalog::new(client.exchanges().await?);
    render::print_catalog(&catalog);
    Ok(())
}

async fn list_assets(client: CoinGeckoClient, limit: u32) -> anyhow::Result<()> {
    let assets = client.top_assets(limit).await?;
    render::print_assets(&assets);
    Ok(())
}
