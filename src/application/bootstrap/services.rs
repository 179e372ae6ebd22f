use std::sync::Arc;

use crate::application::accounts::AccountService;
use crate::application::bootstrap::persistence::PersistenceHandle;
use crate::application::catalog::InstrumentCatalog;
use crate::application::market_data::PriceFeedCache;
use crate::application::portfolio::HoldingsCalculator;
use crate::application::trading::TransactionLedger;
use crate::config::FeedEnvConfig;
use crate::domain::ports::{AuthProvider, MarketFeed};

#[derive(Clone)]
pub struct ServicesHandle {
    pub price_cache: Arc<PriceFeedCache>,
    pub catalog: Arc<InstrumentCatalog>,
    pub holdings: Arc<HoldingsCalculator>,
    pub ledger: Arc<TransactionLedger>,
    pub accounts: Arc<AccountService>,
}

pub struct ServicesBootstrap;

impl ServicesBootstrap {
    pub fn init(
        feed_config: &FeedEnvConfig,
        persistence: &PersistenceHandle,
        feed: Arc<dyn MarketFeed>,
        auth: Arc<dyn AuthProvider>,
    ) -> ServicesHandle {
        let price_cache = Arc::new(PriceFeedCache::new(feed, feed_config.cache_ttl()));

        let catalog = Arc::new(InstrumentCatalog::new(
            persistence.instrument_repository.clone(),
            price_cache.clone(),
            feed_config.default_currency.clone(),
            feed_config.recovery_count,
        ));

        let holdings = Arc::new(HoldingsCalculator::new(
            persistence.ledger_repository.clone(),
        ));

        let ledger = Arc::new(TransactionLedger::new(
            catalog.clone(),
            persistence.ledger_repository.clone(),
        ));

        let accounts = Arc::new(AccountService::new(
            persistence.account_repository.clone(),
            holdings.clone(),
            ledger.clone(),
            auth,
        ));

        ServicesHandle {
            price_cache,
            catalog,
            holdings,
            ledger,
            accounts,
        }
    }
}
