use crate::domain::errors::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type InstrumentId = i64;
pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// Signed contribution of `volume` units on this side to a net position
    pub fn signed(&self, volume: u64) -> i64 {
        let volume = i64::try_from(volume).unwrap_or(i64::MAX);
        match self {
            OrderSide::Buy => volume,
            OrderSide::Sell => -volume,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(LedgerError::InvalidSide(s.to_string())),
        }
    }
}

/// A validated order, ready to be settled by the ledger store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTicket {
    pub user_id: UserId,
    pub instrument_id: InstrumentId,
    pub side: OrderSide,
    pub volume: u64,
}

/// A committed transaction, denormalized with the owner's username and the ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub user_id: UserId,
    pub instrument_id: InstrumentId,
    pub username: String,
    pub ticker: String,
    pub side: OrderSide,
    pub volume: u64,
    pub execution_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Inclusive time window used to filter transaction history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

/// Converts stored Unix milliseconds back to a UTC timestamp
pub fn timestamp_from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
}
