use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while talking to the external market-data feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Market data feed unavailable: {source}")]
    Unavailable {
        #[source]
        source: anyhow::Error,
    },
}

impl FeedError {
    pub fn unavailable(source: impl Into<anyhow::Error>) -> Self {
        FeedError::Unavailable {
            source: source.into(),
        }
    }
}

/// Errors related to the tradable-instrument catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Stock with ticker {0} already exists")]
    DuplicateTicker(String),

    #[error("Price must be greater than 0, got {0}")]
    InvalidPrice(Decimal),

    #[error("Ticker must not be empty")]
    EmptyTicker,

    #[error("Failed to sync instruments: {0}")]
    SyncFailed(#[source] anyhow::Error),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("Catalog storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Errors related to order validation and settlement
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Volume must be greater than 0, got {0}")]
    InvalidVolume(i64),

    #[error("Transaction type must be BUY or SELL, got '{0}'")]
    InvalidSide(String),

    #[error("Stock/Token '{0}' not found. Please ensure the ticker is correct.")]
    InstrumentNotFound(String),

    #[error("{ticker} has no positive price and cannot be traded")]
    NotTradable { ticker: String },

    #[error("Account {0} not found")]
    AccountNotFound(i64),

    #[error("Insufficient balance: need {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient holdings. You only have {available} units of {ticker}")]
    InsufficientHoldings {
        ticker: String,
        requested: u64,
        available: u64,
    },

    #[error("Failed to commit transaction: {0}")]
    CommitFailed(#[source] anyhow::Error),
}

/// Errors related to account registration and lookup
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username must not be empty")]
    InvalidUsername,

    #[error("Password must not be empty")]
    InvalidPassword,

    #[error("Balance must be greater than zero, got {0}")]
    InvalidInitialBalance(Decimal),

    #[error("Username {0} already exists")]
    DuplicateUsername(String),

    #[error("User {0} not found")]
    NotFound(String),

    #[error("Not authorized to access data of {0}")]
    Forbidden(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Account storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Errors raised by the credential and token provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Credential processing failed: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_holdings_reports_available() {
        let err = LedgerError::InsufficientHoldings {
            ticker: "BTC".to_string(),
            requested: 10,
            available: 5,
        };

        let msg = err.to_string();
        assert!(msg.contains("only have 5 units of BTC"));
    }

    #[test]
    fn test_insufficient_balance_formatting() {
        let err = LedgerError::InsufficientBalance {
            required: dec!(200),
            available: dec!(100),
        };

        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_feed_error_keeps_source() {
        let err = FeedError::unavailable(anyhow::anyhow!("connection reset"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection reset"));
    }
}
