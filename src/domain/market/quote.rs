use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One instrument entry from the market-data feed.
///
/// Only `symbol`, `name` and `current_price` drive the catalog. Every other
/// field the feed sends (market cap, image, 24h change, ...) is kept in
/// `extra` so it can be handed back to API clients untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedQuote {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FeedQuote {
    pub fn new(symbol: &str, name: &str, current_price: Decimal) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            name: Some(name.to_string()),
            current_price: Some(current_price),
            extra: serde_json::Map::new(),
        }
    }
}
