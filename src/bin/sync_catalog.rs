//! Catalog Sync Binary
//!
//! Pulls the top instruments from the market feed once and upserts them into
//! the catalog.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tradedesk::application::system::Application;
use tradedesk::config::Config;
use tradedesk::infrastructure::observability::init_tracing;

#[derive(Parser)]
#[command(author, version, about = "Sync the instrument catalog from the market feed", long_about = None)]
struct Cli {
    /// Quote currency (defaults to FEED_DEFAULT_CURRENCY)
    #[arg(short, long)]
    currency: Option<String>,

    /// Number of instruments to fetch (defaults to FEED_SYNC_COUNT)
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Database URL (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    init_tracing(config.observability.log_format);

    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    let currency = cli
        .currency
        .unwrap_or_else(|| config.feed.default_currency.clone());
    let count = cli.count.unwrap_or(config.feed.sync_count);

    let app = Application::build(config).await?;

    info!("Syncing {} instruments in {}...", count, currency);
    let report = app
        .services
        .catalog
        .sync_from_feed(&currency, count)
        .await
        .context("Catalog sync failed")?;

    println!(
        "fetched={} unique={} created={} updated={}",
        report.fetched, report.unique, report.created, report.updated
    );
    Ok(())
}
