//! Request and response bodies of the HTTP API

use crate::domain::market::instrument::Instrument;
use crate::domain::market::quote::FeedQuote;
use crate::domain::trading::types::{DateRange, TransactionRecord};
use crate::interfaces::http::error::ApiError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
    pub username: String,
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub ticker: String,
    pub transaction_type: String,
    pub transaction_volume: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub username: String,
    pub ticker: String,
    pub transaction_type: String,
    pub transaction_volume: u64,
    pub transaction_price: Decimal,
    pub created_time: DateTime<Utc>,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            ticker: record.ticker,
            transaction_type: record.side.as_str().to_string(),
            transaction_volume: record.volume,
            transaction_price: record.execution_price,
            created_time: record.created_at,
        }
    }
}

/// `?start=&end=` bounds, RFC 3339
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl HistoryQuery {
    pub fn range(&self) -> Result<Option<DateRange>, ApiError> {
        let start = parse_bound("start", self.start.as_deref())?;
        let end = parse_bound("end", self.end.as_deref())?;

        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(ApiError::Validation(
                "start must not be after end".to_string(),
            ));
        }

        Ok(match (start, end) {
            (None, None) => None,
            _ => Some(DateRange { start, end }),
        })
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| ApiError::Validation(format!("Invalid {} '{}': {}", name, value, e))),
    }
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub ticker: String,
    pub stock_name: String,
    pub stock_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StockResponse {
    pub id: i64,
    pub ticker: String,
    pub stock_name: String,
    pub stock_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<Instrument> for StockResponse {
    fn from(instrument: Instrument) -> Self {
        Self {
            id: instrument.id,
            ticker: instrument.ticker,
            stock_name: instrument.name,
            stock_price: instrument.last_price,
            updated_at: instrument.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TopCryptoQuery {
    pub vs_currency: Option<String>,
    #[serde(default)]
    pub sync: bool,
}

#[derive(Debug, Serialize)]
pub struct TopCryptoResponse {
    pub top_20_cryptocurrencies: Vec<FeedQuote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncQuery {
    /// Drop cached feed data before syncing
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
}
