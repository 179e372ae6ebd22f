use crate::domain::repositories::LedgerRepository;
use crate::domain::trading::holdings::{clamp_holding, positive_positions};
use crate::domain::trading::types::{InstrumentId, UserId};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Derives per-user positions from the transaction history.
///
/// Nothing is cached: every call aggregates the ledger again, so the result
/// always matches committed history.
pub struct HoldingsCalculator {
    ledger: Arc<dyn LedgerRepository>,
}

impl HoldingsCalculator {
    pub fn new(ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { ledger }
    }

    pub async fn holdings_for(&self, user_id: UserId, instrument_id: InstrumentId) -> Result<u64> {
        let net = self.ledger.net_volume(user_id, instrument_id).await?;
        Ok(clamp_holding(net))
    }

    /// Positive positions by ticker; flat or short positions are omitted.
    pub async fn all_holdings_for(&self, user_id: UserId) -> Result<BTreeMap<String, u64>> {
        let nets = self.ledger.net_volumes_by_ticker(user_id).await?;
        Ok(positive_positions(nets))
    }
}
