#![allow(dead_code)]

use rust_decimal::Decimal;
use std::sync::Arc;
use tradedesk::application::bootstrap::persistence::PersistenceBootstrap;
use tradedesk::application::system::Application;
use tradedesk::config::Config;
use tradedesk::domain::account::{Registration, UserAccount};
use tradedesk::domain::market::instrument::Instrument;
use tradedesk::domain::market::quote::FeedQuote;
use tradedesk::infrastructure::mock::MockMarketFeed;
use tradedesk::infrastructure::persistence::database::Database;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Application over a private in-memory SQLite database and a scripted feed
pub async fn sqlite_app(feed: &MockMarketFeed) -> anyhow::Result<Application> {
    init_logging();
    let db = Database::in_memory().await?;
    let persistence = PersistenceBootstrap::from_database(db);
    Ok(Application::with_parts(
        test_config(),
        persistence,
        Arc::new(feed.clone()),
    ))
}

/// Application over an on-disk SQLite database with a full connection pool
pub async fn file_app(
    path: &std::path::Path,
    feed: &MockMarketFeed,
) -> anyhow::Result<Application> {
    init_logging();
    let db = Database::new(&format!("sqlite://{}", path.display())).await?;
    let persistence = PersistenceBootstrap::from_database(db);
    Ok(Application::with_parts(
        test_config(),
        persistence,
        Arc::new(feed.clone()),
    ))
}

pub async fn register(
    app: &Application,
    username: &str,
    balance: Decimal,
) -> anyhow::Result<UserAccount> {
    Ok(app
        .services
        .accounts
        .register(Registration {
            username: username.to_string(),
            password: "password123".to_string(),
            balance,
        })
        .await?)
}

pub async fn list_instrument(
    app: &Application,
    ticker: &str,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Instrument> {
    Ok(app
        .services
        .catalog
        .register_manual(ticker, name, price)
        .await?)
}

pub fn quote(symbol: &str, name: &str, price: Decimal) -> FeedQuote {
    FeedQuote::new(symbol, name, price)
}

/// Makes every write matching `event` fail inside SQLite, as a full disk would.
pub async fn fail_writes(app: &Application, name: &str, event: &str) -> anyhow::Result<()> {
    let db = app
        .persistence
        .db
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("application is not backed by SQLite"))?;
    let ddl = format!("CREATE TRIGGER {name} {event} BEGIN SELECT RAISE(ABORT, 'disk full'); END;");
    sqlx::query(&ddl).execute(&db.pool).await?;
    Ok(())
}
