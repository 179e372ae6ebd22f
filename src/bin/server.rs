//! tradedesk Server - HTTP trading ledger
//!
//! Serves the JSON API over SQLite until Ctrl+C.
//!
//! # Usage
//! ```sh
//! DATABASE_URL=sqlite://data/tradedesk.db cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - Listen address (default: 0.0.0.0:8000)
//! - `JWT_SECRET` - Token signing secret (a development placeholder when unset)
//! - `LOG_FORMAT` - `pretty` or `compact` (default: pretty)

use anyhow::Result;
use tracing::info;
use tradedesk::application::system::Application;
use tradedesk::config::Config;
use tradedesk::infrastructure::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.observability.log_format);

    info!("tradedesk Server {} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: Database={}, Feed={} (ttl {}s)",
        config.database_url, config.feed.base_url, config.feed.cache_ttl_secs
    );

    let app = Application::build(config).await?;

    info!("Server running. Press Ctrl+C to shutdown.");
    app.run().await
}
