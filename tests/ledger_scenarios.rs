mod common;

use common::{fail_writes, list_instrument, quote, register, sqlite_app};
use rust_decimal_macros::dec;
use tradedesk::domain::errors::LedgerError;
use tradedesk::domain::repositories::AccountRepository;
use tradedesk::domain::trading::types::{DateRange, OrderSide};
use tradedesk::infrastructure::mock::MockMarketFeed;

#[tokio::test]
async fn test_buy_debits_balance_and_adds_holdings() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::default()).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;
    list_instrument(&app, "BTC", "Bitcoin", dec!(50)).await?;

    let record = app.services.ledger.submit(alice.id, "BTC", "BUY", 10).await?;

    assert_eq!(record.execution_price, dec!(500));
    assert_eq!(record.username, "alice");
    assert_eq!(record.ticker, "BTC");
    assert_eq!(record.side, OrderSide::Buy);

    let profile = app.services.accounts.profile("alice", "alice").await?;
    assert_eq!(profile.balance, dec!(500));
    assert_eq!(profile.holdings.get("BTC"), Some(&10));
    Ok(())
}

#[tokio::test]
async fn test_sell_more_than_held_reports_available() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::default()).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;
    list_instrument(&app, "BTC", "Bitcoin", dec!(50)).await?;

    app.services.ledger.submit(alice.id, "BTC", "BUY", 5).await?;
    let err = app
        .services
        .ledger
        .submit(alice.id, "BTC", "SELL", 10)
        .await
        .unwrap_err();

    match err {
        LedgerError::InsufficientHoldings {
            ref ticker,
            requested,
            available,
        } => {
            assert_eq!(ticker, "BTC");
            assert_eq!(requested, 10);
            assert_eq!(available, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("only have 5 units of BTC"));

    // Rejected order leaves no trace
    let history = app.services.ledger.history(alice.id, None).await?;
    assert_eq!(history.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_buy_beyond_balance_is_rejected() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::default()).await?;
    let bob = register(&app, "bob", dec!(100)).await?;
    list_instrument(&app, "ETH", "Ethereum", dec!(200)).await?;

    let err = app
        .services
        .ledger
        .submit(bob.id, "ETH", "BUY", 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientBalance { required, available }
            if required == dec!(200) && available == dec!(100)
    ));

    let account = app
        .persistence
        .account_repository
        .find_by_id(bob.id)
        .await?
        .expect("account exists");
    assert_eq!(account.balance, dec!(100));
    assert!(app.services.ledger.history(bob.id, None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_round_trip_restores_balance() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::default()).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;
    list_instrument(&app, "SOL", "Solana", dec!(12.5)).await?;

    app.services.ledger.submit(alice.id, "SOL", "BUY", 8).await?;
    app.services.ledger.submit(alice.id, "sol", "sell", 8).await?;

    let profile = app.services.accounts.profile("alice", "alice").await?;
    assert_eq!(profile.balance, dec!(1000));
    assert!(profile.holdings.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_ticker_is_synced_from_feed() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![
        quote("btc", "Bitcoin", dec!(50)),
        quote("doge", "Dogecoin", dec!(0.25)),
    ]);
    let app = sqlite_app(&feed).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;

    let record = app.services.ledger.submit(alice.id, "DOGE", "BUY", 100).await?;

    assert_eq!(record.ticker, "DOGE");
    assert_eq!(record.execution_price, dec!(25));
    assert_eq!(feed.calls(), 1);
    assert_eq!(feed.last_request().await, Some(("usd".to_string(), 250)));
    // The whole recovery batch landed, not just the requested ticker
    assert!(app.services.catalog.find_by_ticker("BTC").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_unknown_ticker_with_feed_down_is_not_found() -> anyhow::Result<()> {
    let feed = MockMarketFeed::failing();
    let app = sqlite_app(&feed).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;

    let err = app
        .services
        .ledger
        .submit(alice.id, "DOGE", "BUY", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InstrumentNotFound(ref t) if t == "DOGE"));
    assert_eq!(feed.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_ticker_absent_from_feed_is_not_found() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![quote("btc", "Bitcoin", dec!(50))]);
    let app = sqlite_app(&feed).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;

    let err = app
        .services
        .ledger
        .submit(alice.id, "DOGE", "SELL", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InstrumentNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_history_is_ordered_and_filterable() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::default()).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;
    list_instrument(&app, "BTC", "Bitcoin", dec!(10)).await?;

    let first = app.services.ledger.submit(alice.id, "BTC", "BUY", 3).await?;
    let second = app.services.ledger.submit(alice.id, "BTC", "SELL", 1).await?;

    let all = app.services.ledger.history(alice.id, None).await?;
    assert_eq!(
        all.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );

    let future = DateRange {
        start: Some(second.created_at + chrono::Duration::hours(1)),
        end: None,
    };
    assert!(app.services.ledger.history(alice.id, Some(future)).await?.is_empty());

    let inclusive = DateRange {
        start: Some(first.created_at),
        end: Some(second.created_at),
    };
    assert_eq!(
        app.services.ledger.history(alice.id, Some(inclusive)).await?.len(),
        2
    );
    Ok(())
}

#[tokio::test]
async fn test_zero_priced_instrument_is_not_tradable() -> anyhow::Result<()> {
    let feed = MockMarketFeed::new(vec![tradedesk::domain::market::quote::FeedQuote {
        current_price: None,
        ..quote("new", "Fresh Listing", dec!(0))
    }]);
    let app = sqlite_app(&feed).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;

    app.services.catalog.sync_from_feed("usd", 100).await?;
    let listed = app.services.catalog.find_by_ticker("NEW").await?;
    assert_eq!(listed.map(|i| i.last_price), Some(dec!(0)));

    let err = app
        .services
        .ledger
        .submit(alice.id, "NEW", "BUY", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotTradable { .. }));
    Ok(())
}

#[tokio::test]
async fn test_storage_failure_rolls_back_the_whole_order() -> anyhow::Result<()> {
    let app = sqlite_app(&MockMarketFeed::default()).await?;
    let alice = register(&app, "alice", dec!(1000)).await?;
    list_instrument(&app, "BTC", "Bitcoin", dec!(50)).await?;
    fail_writes(&app, "reject_transactions", "BEFORE INSERT ON transactions").await?;

    let err = app
        .services
        .ledger
        .submit(alice.id, "BTC", "BUY", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::CommitFailed(_)));

    // The balance debit ran before the failing insert and must be undone
    let profile = app.services.accounts.profile("alice", "alice").await?;
    assert_eq!(profile.balance, dec!(1000));
    assert!(profile.holdings.is_empty());
    assert!(app.services.ledger.history(alice.id, None).await?.is_empty());
    Ok(())
}
