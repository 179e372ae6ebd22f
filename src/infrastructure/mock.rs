use crate::domain::errors::FeedError;
use crate::domain::market::quote::FeedQuote;
use crate::domain::ports::MarketFeed;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// Scripted market feed for tests and offline runs.
///
/// Clones share state, so a test can keep a handle to change quotes or flip
/// the failure switch after the feed has been handed to a service.
#[derive(Clone, Default)]
pub struct MockMarketFeed {
    quotes: Arc<RwLock<Vec<FeedQuote>>>,
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<RwLock<Option<(String, u32)>>>,
}

impl MockMarketFeed {
    pub fn new(quotes: Vec<FeedQuote>) -> Self {
        Self {
            quotes: Arc::new(RwLock::new(quotes)),
            ..Self::default()
        }
    }

    /// A feed whose every call fails
    pub fn failing() -> Self {
        let feed = Self::default();
        feed.set_failing(true);
        feed
    }

    pub async fn set_quotes(&self, quotes: Vec<FeedQuote>) {
        *self.quotes.write().await = quotes;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `fetch_markets` calls so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_request(&self) -> Option<(String, u32)> {
        self.last_request.read().await.clone()
    }
}

#[async_trait]
impl MarketFeed for MockMarketFeed {
    async fn fetch_markets(&self, currency: &str, count: u32) -> Result<Vec<FeedQuote>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.write().await = Some((currency.to_string(), count));

        if self.failing.load(Ordering::SeqCst) {
            return Err(FeedError::unavailable(anyhow::anyhow!(
                "MockMarketFeed: simulated outage"
            )));
        }

        let quotes: Vec<FeedQuote> = self
            .quotes
            .read()
            .await
            .iter()
            .take(count as usize)
            .cloned()
            .collect();

        info!("MockMarketFeed: serving {} quotes ({})", quotes.len(), currency);
        Ok(quotes)
    }
}
