use crate::domain::errors::FeedError;
use crate::domain::market::quote::FeedQuote;
use crate::domain::ports::MarketFeed;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

type CacheKey = (String, u32);

/// Time-bounded cache in front of the market feed, keyed by
/// `(currency, count)`.
///
/// A failed refresh never falls back to a stale entry: the caller gets the
/// error and the old entry stays in place untouched.
pub struct PriceFeedCache {
    feed: Arc<dyn MarketFeed>,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, (Arc<Vec<FeedQuote>>, Instant)>>,
}

// Manual Debug implementation, the feed is a trait object
impl std::fmt::Debug for PriceFeedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceFeedCache")
            .field("ttl", &self.ttl)
            .field("entries", &"<RwLock>")
            .finish()
    }
}

impl PriceFeedCache {
    pub fn new(feed: Arc<dyn MarketFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn fetch_prices(
        &self,
        currency: &str,
        count: u32,
    ) -> Result<Arc<Vec<FeedQuote>>, FeedError> {
        let key = (currency.trim().to_lowercase(), count);

        if let Some((payload, fetched_at)) = self.entries.read().await.get(&key)
            && fetched_at.elapsed() < self.ttl
        {
            debug!("PriceFeedCache: hit for {:?} ({} quotes)", key, payload.len());
            return Ok(payload.clone());
        }

        let quotes = Arc::new(self.feed.fetch_markets(&key.0, count).await?);

        self.entries
            .write()
            .await
            .insert(key, (quotes.clone(), Instant::now()));

        Ok(quotes)
    }

    /// Drops every cached entry
    pub async fn invalidate(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
