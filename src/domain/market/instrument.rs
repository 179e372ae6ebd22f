use crate::domain::market::quote::FeedQuote;
use crate::domain::trading::types::InstrumentId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column width of `instruments.ticker`
pub const MAX_TICKER_LEN: usize = 10;
/// Column width of `instruments.name`
pub const MAX_NAME_LEN: usize = 40;

const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub ticker: String,
    pub name: String,
    pub last_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Instrument {
    pub fn is_tradable(&self) -> bool {
        self.last_price > Decimal::ZERO
    }
}

/// Normalized instrument fields waiting to be written to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDraft {
    pub ticker: String,
    pub name: String,
    pub last_price: Decimal,
}

impl InstrumentDraft {
    pub fn new(ticker: &str, name: &str, last_price: Decimal) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            name: truncate_chars(name, MAX_NAME_LEN),
            last_price,
        }
    }
}

/// Counts reported by one batch upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub created: usize,
    pub updated: usize,
}

/// Uppercases and truncates a ticker to the catalog width.
pub fn normalize_ticker(raw: &str) -> String {
    truncate_chars(&raw.trim().to_uppercase(), MAX_TICKER_LEN)
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Turns a raw feed batch into catalog drafts.
///
/// Entries with an empty ticker are skipped, and when several entries share a
/// normalized ticker only the first one survives. Feeds are ordered by market
/// cap, so the entry that is dropped is the less significant one.
pub fn prepare_batch(quotes: &[FeedQuote]) -> Vec<InstrumentDraft> {
    let mut seen = HashSet::new();
    let mut drafts = Vec::with_capacity(quotes.len());

    for quote in quotes {
        let ticker = normalize_ticker(quote.symbol.as_deref().unwrap_or_default());
        if ticker.is_empty() || !seen.insert(ticker.clone()) {
            continue;
        }

        let name = quote.name.as_deref().unwrap_or(UNKNOWN_NAME);
        drafts.push(InstrumentDraft {
            ticker,
            name: truncate_chars(name, MAX_NAME_LEN),
            last_price: quote.current_price.unwrap_or(Decimal::ZERO),
        });
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_ticker_uppercases_and_truncates() {
        assert_eq!(normalize_ticker("btc"), "BTC");
        assert_eq!(normalize_ticker(" eth "), "ETH");
        assert_eq!(normalize_ticker("averyverylongticker"), "AVERYVERYL");
    }

    #[test]
    fn test_draft_truncates_long_names() {
        let draft = InstrumentDraft::new("abc", &"x".repeat(60), dec!(1));
        assert_eq!(draft.ticker, "ABC");
        assert_eq!(draft.name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_prepare_batch_keeps_first_duplicate() {
        let quotes = vec![
            FeedQuote::new("btc", "Bitcoin", dec!(50000)),
            FeedQuote::new("BTC", "Batcoin", dec!(0.01)),
            FeedQuote::new("eth", "Ethereum", dec!(3000)),
        ];

        let drafts = prepare_batch(&quotes);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].ticker, "BTC");
        assert_eq!(drafts[0].name, "Bitcoin");
        assert_eq!(drafts[0].last_price, dec!(50000));
        assert_eq!(drafts[1].ticker, "ETH");
    }

    #[test]
    fn test_prepare_batch_dedups_after_truncation() {
        let quotes = vec![
            FeedQuote::new("abcdefghijk1", "First", dec!(1)),
            FeedQuote::new("abcdefghijk2", "Second", dec!(2)),
        ];

        let drafts = prepare_batch(&quotes);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "First");
    }

    #[test]
    fn test_prepare_batch_skips_empty_and_defaults_missing_fields() {
        let mut nameless = FeedQuote::new("sol", "", dec!(0));
        nameless.name = None;
        nameless.current_price = None;

        let mut symbolless = FeedQuote::new("x", "No Symbol", dec!(1));
        symbolless.symbol = None;

        let quotes = vec![FeedQuote::new("  ", "Blank", dec!(1)), symbolless, nameless];

        let drafts = prepare_batch(&quotes);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].ticker, "SOL");
        assert_eq!(drafts[0].name, "Unknown");
        assert_eq!(drafts[0].last_price, Decimal::ZERO);
    }
}
