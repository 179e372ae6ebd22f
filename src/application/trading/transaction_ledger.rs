use crate::application::catalog::InstrumentCatalog;
use crate::domain::errors::LedgerError;
use crate::domain::repositories::LedgerRepository;
use crate::domain::trading::types::{DateRange, OrderSide, OrderTicket, TransactionRecord, UserId};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Validates orders and hands them to the ledger store for settlement.
pub struct TransactionLedger {
    catalog: Arc<InstrumentCatalog>,
    ledger: Arc<dyn LedgerRepository>,
}

impl TransactionLedger {
    pub fn new(catalog: Arc<InstrumentCatalog>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { catalog, ledger }
    }

    /// Submits a BUY or SELL order.
    ///
    /// Volume and side are checked before the ticker is resolved, so a
    /// malformed order never triggers a catalog sync. Balance and holdings are
    /// checked by the store inside the same transaction that writes them.
    pub async fn submit(
        &self,
        user_id: UserId,
        ticker: &str,
        side: &str,
        volume: i64,
    ) -> Result<TransactionRecord, LedgerError> {
        if volume <= 0 {
            return Err(LedgerError::InvalidVolume(volume));
        }
        let volume = volume.unsigned_abs();
        let side: OrderSide = side.parse()?;

        let instrument = self
            .catalog
            .resolve(ticker)
            .await
            .map_err(|e| LedgerError::CommitFailed(anyhow::Error::new(e)))?
            .into_instrument()
            .ok_or_else(|| LedgerError::InstrumentNotFound(ticker.trim().to_string()))?;

        let order = OrderTicket {
            user_id,
            instrument_id: instrument.id,
            side,
            volume,
        };

        match self.ledger.settle(&order).await {
            Ok(record) => Ok(record),
            Err(LedgerError::CommitFailed(source)) => {
                error!(
                    "TransactionLedger: {} {} x{} for user {} rolled back: {:#}",
                    side, instrument.ticker, volume, user_id, source
                );
                Err(LedgerError::CommitFailed(source))
            }
            Err(rejected) => {
                info!(
                    "TransactionLedger: {} {} x{} for user {} rejected: {}",
                    side, instrument.ticker, volume, user_id, rejected
                );
                Err(rejected)
            }
        }
    }

    /// Transactions of `user_id`, oldest first, optionally bounded by `range`
    pub async fn history(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRecord>> {
        self.ledger.history(user_id, range).await
    }
}
