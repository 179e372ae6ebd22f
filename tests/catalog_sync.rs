mod common;

use common::{fail_writes, list_instrument, quote, sqlite_app};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tradedesk::application::bootstrap::persistence::PersistenceBootstrap;
use tradedesk::application::system::Application;
use tradedesk::domain::errors::CatalogError;
use tradedesk::infrastructure::coingecko::CoinGeckoMarketFeed;
use tradedesk::infrastructure::mock::MockMarketFeed;
use tradedesk::infrastructure::persistence::database::Database;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_sync_twice_is_idempotent() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![
        quote("btc", "Bitcoin", dec!(50)),
        quote("eth", "Ethereum", dec!(3)),
    ]);
    let app = sqlite_app(&feed).await?;
    let catalog = &app.services.catalog;

    let first = catalog.sync_from_feed("usd", 100).await?;
    assert_eq!((first.created, first.updated), (2, 0));
    let before = catalog.list().await?;

    // Bypass the cache so the second sync really hits the store again
    app.services.price_cache.invalidate().await;
    let second = catalog.sync_from_feed("usd", 100).await?;
    assert_eq!((second.created, second.updated), (0, 2));
    let after = catalog.list().await?;

    let summary = |list: &[tradedesk::domain::market::instrument::Instrument]| {
        list.iter()
            .map(|i| (i.ticker.clone(), i.name.clone(), i.last_price))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&before), summary(&after));
    assert_eq!(feed.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_ticker_in_batch_keeps_first() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![
        quote("usdt", "Tether", dec!(1.00)),
        quote("USDT", "Bridged Tether", dec!(0.99)),
    ]);
    let app = sqlite_app(&feed).await?;

    let report = app.services.catalog.sync_from_feed("usd", 100).await?;
    assert_eq!(report.fetched, 2);
    assert_eq!(report.unique, 1);

    let all = app.services.catalog.list().await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Tether");
    assert_eq!(all[0].last_price, dec!(1.00));
    Ok(())
}

#[tokio::test]
async fn test_sync_updates_manual_listing() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![quote("btc", "Bitcoin", dec!(64000))]);
    let app = sqlite_app(&feed).await?;
    list_instrument(&app, "btc", "Manual Bitcoin", dec!(1)).await?;

    let report = app.services.catalog.sync_from_feed("usd", 100).await?;
    assert_eq!((report.created, report.updated), (0, 1));

    let btc = app.services.catalog.find_by_ticker("BTC").await?.expect("listed");
    assert_eq!(btc.name, "Bitcoin");
    assert_eq!(btc.last_price, dec!(64000));
    Ok(())
}

#[tokio::test]
async fn test_feed_failure_surfaces_and_writes_nothing() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::failing()).await?;

    let err = app
        .services
        .catalog
        .sync_from_feed("usd", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Feed(_)));
    assert!(app.services.catalog.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_coingecko_sync_end_to_end() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 64000.12},
            {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3100},
            {"id": "mystery", "symbol": "mys", "name": null, "current_price": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let feed = CoinGeckoMarketFeed::builder()
        .base_url(server.uri())
        .timeout(Duration::from_secs(5))
        .build();
    let persistence = PersistenceBootstrap::from_database(Database::in_memory().await?);
    let app = Application::with_parts(common::test_config(), persistence, Arc::new(feed));

    let report = app.services.catalog.sync_from_feed("usd", 100).await?;
    assert_eq!(report.created, 3);

    // Served from cache, the mock expects exactly one request
    app.services.catalog.sync_from_feed("USD", 100).await?;

    let btc = app.services.catalog.find_by_ticker("btc").await?.expect("synced");
    assert_eq!(btc.last_price, dec!(64000.12));
    let mystery = app.services.catalog.find_by_ticker("MYS").await?.expect("synced");
    assert_eq!(mystery.name, "Unknown");
    assert!(!mystery.is_tradable());
    Ok(())
}

#[tokio::test]
async fn test_storage_failure_rolls_back_the_whole_batch() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![
        quote("btc", "Bitcoin", dec!(99)),
        quote("eth", "Ethereum", dec!(3)),
    ]);
    let app = sqlite_app(&feed).await?;
    list_instrument(&app, "BTC", "Old", dec!(1)).await?;
    fail_writes(
        &app,
        "reject_eth",
        "BEFORE INSERT ON instruments WHEN NEW.ticker = 'ETH'",
    )
    .await?;

    let err = app
        .services
        .catalog
        .sync_from_feed("usd", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::SyncFailed(_)));

    // BTC was updated earlier in the same batch
    let btc = app.services.catalog.find_by_ticker("BTC").await?.expect("listed");
    assert_eq!(btc.name, "Old");
    assert_eq!(btc.last_price, dec!(1));
    assert!(app.services.catalog.find_by_ticker("ETH").await?.is_none());
    Ok(())
}
