//! Instrument Catalog
//!
//! Owns the set of tradable instruments: manual registration, feed sync and
//! the two-phase lookup the ledger uses when a ticker is not known yet.

use crate::application::market_data::price_feed_cache::PriceFeedCache;
use crate::domain::errors::CatalogError;
use crate::domain::market::instrument::{
    Instrument, InstrumentDraft, UpsertOutcome, normalize_ticker, prepare_batch,
};
use crate::domain::market::quote::FeedQuote;
use crate::domain::repositories::InstrumentRepository;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of `InstrumentCatalog::resolve`
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Already in the catalog
    Found(Instrument),
    /// Added by the recovery sync
    Synced(Instrument),
    Missing,
}

impl Lookup {
    pub fn into_instrument(self) -> Option<Instrument> {
        match self {
            Lookup::Found(instrument) | Lookup::Synced(instrument) => Some(instrument),
            Lookup::Missing => None,
        }
    }
}

/// Counts for one feed sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries returned by the feed
    pub fetched: usize,
    /// Entries left after dropping empty and duplicate tickers
    pub unique: usize,
    pub created: usize,
    pub updated: usize,
}

pub struct InstrumentCatalog {
    instruments: Arc<dyn InstrumentRepository>,
    prices: Arc<PriceFeedCache>,
    default_currency: String,
    recovery_count: u32,
}

impl InstrumentCatalog {
    pub fn new(
        instruments: Arc<dyn InstrumentRepository>,
        prices: Arc<PriceFeedCache>,
        default_currency: impl Into<String>,
        recovery_count: u32,
    ) -> Self {
        Self {
            instruments,
            prices,
            default_currency: default_currency.into(),
            recovery_count,
        }
    }

    pub fn prices(&self) -> &Arc<PriceFeedCache> {
        &self.prices
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    pub async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Instrument>, CatalogError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Ok(None);
        }

        self.instruments
            .find_by_ticker(&ticker)
            .await
            .map_err(CatalogError::Storage)
    }

    pub async fn list(&self) -> Result<Vec<Instrument>, CatalogError> {
        self.instruments.list().await.map_err(CatalogError::Storage)
    }

    /// Adds an instrument by hand. An existing ticker is reported before the
    /// price is looked at.
    pub async fn register_manual(
        &self,
        ticker: &str,
        name: &str,
        price: Decimal,
    ) -> Result<Instrument, CatalogError> {
        let draft = InstrumentDraft::new(ticker, name, price);
        if draft.ticker.is_empty() {
            return Err(CatalogError::EmptyTicker);
        }

        if self
            .instruments
            .find_by_ticker(&draft.ticker)
            .await
            .map_err(CatalogError::Storage)?
            .is_some()
        {
            return Err(CatalogError::DuplicateTicker(draft.ticker));
        }

        if price <= Decimal::ZERO {
            return Err(CatalogError::InvalidPrice(price));
        }

        let instrument = self.instruments.insert(&draft).await?;
        info!(
            "Catalog: registered {} ({}) at {}",
            instrument.ticker, instrument.name, instrument.last_price
        );
        Ok(instrument)
    }

    /// Writes a feed batch to the catalog and returns how many instruments
    /// were newly created.
    pub async fn upsert_from_feed(&self, entries: &[FeedQuote]) -> Result<usize, CatalogError> {
        let (_, outcome) = self.apply_batch(entries).await?;
        Ok(outcome.created)
    }

    async fn apply_batch(
        &self,
        entries: &[FeedQuote],
    ) -> Result<(usize, UpsertOutcome), CatalogError> {
        let drafts = prepare_batch(entries);
        if drafts.is_empty() {
            return Ok((0, UpsertOutcome::default()));
        }

        let outcome = self
            .instruments
            .upsert_batch(&drafts)
            .await
            .map_err(CatalogError::SyncFailed)?;

        info!(
            "Synced {} unique instruments ({} new)",
            drafts.len(),
            outcome.created
        );
        Ok((drafts.len(), outcome))
    }

    /// Fetches `count` feed entries in `currency` and upserts them.
    pub async fn sync_from_feed(
        &self,
        currency: &str,
        count: u32,
    ) -> Result<SyncReport, CatalogError> {
        let quotes = self.prices.fetch_prices(currency, count).await?;
        let (unique, outcome) = self.apply_batch(&quotes).await?;

        Ok(SyncReport {
            fetched: quotes.len(),
            unique,
            created: outcome.created,
            updated: outcome.updated,
        })
    }

    /// Local lookup first. On a miss, one recovery sync of `recovery_count`
    /// entries in the default currency, then a second lookup. A failed
    /// recovery is logged and reported as `Missing`.
    pub async fn resolve(&self, ticker: &str) -> Result<Lookup, CatalogError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Ok(Lookup::Missing);
        }

        if let Some(instrument) = self.find_by_ticker(&ticker).await? {
            return Ok(Lookup::Found(instrument));
        }

        info!("Catalog: {} not found locally, syncing from feed", ticker);
        if let Err(e) = self
            .sync_from_feed(&self.default_currency, self.recovery_count)
            .await
        {
            warn!("Catalog: recovery sync for {} failed: {}", ticker, e);
            return Ok(Lookup::Missing);
        }

        Ok(match self.find_by_ticker(&ticker).await? {
            Some(instrument) => Lookup::Synced(instrument),
            None => Lookup::Missing,
        })
    }
}
