//! In-Memory Repository Implementations
//!
//! This module provides a thread-safe, in-memory implementation of every
//! repository trait defined in `domain::repositories`.
//!
//! # Features
//!
//! - **Thread-safe**: one `tokio::sync::Mutex` guards the whole store, so
//!   batch upserts and order settlement are atomic and serialized
//! - **Same rules**: settlement and holdings go through the same domain
//!   functions the SQLite store uses
//! - **Testing**: Ideal for unit tests and development
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - No persistence across multiple instances

use crate::domain::account::{NewAccount, UserAccount};
use crate::domain::errors::{AccountError, CatalogError, LedgerError};
use crate::domain::market::instrument::{Instrument, InstrumentDraft, UpsertOutcome};
use crate::domain::repositories::{AccountRepository, InstrumentRepository, LedgerRepository};
use crate::domain::trading::holdings::{clamp_holding, net_position};
use crate::domain::trading::settlement::{SettlementInput, settle};
use crate::domain::trading::types::{
    DateRange, InstrumentId, OrderTicket, TransactionRecord, UserId,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct StoreState {
    accounts: Vec<UserAccount>,
    instruments: Vec<Instrument>,
    transactions: Vec<TransactionRecord>,
}

impl StoreState {
    fn net_volume(&self, user_id: UserId, instrument_id: InstrumentId) -> i64 {
        net_position(
            self.transactions
                .iter()
                .filter(|t| t.user_id == user_id && t.instrument_id == instrument_id)
                .map(|t| (t.side, t.volume)),
        )
    }
}

/// In-memory ledger store, cheap to clone (clones share state)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transaction without validation. Lets tests build histories
    /// that `settle` would refuse, to check the holdings clamp.
    pub async fn append_unchecked(&self, record: TransactionRecord) {
        self.state.lock().await.transactions.push(record);
    }

    /// Overwrites an instrument price in place, as a feed sync would
    pub async fn set_price(&self, ticker: &str, price: rust_decimal::Decimal) {
        let mut state = self.state.lock().await;
        if let Some(instrument) = state.instruments.iter_mut().find(|i| i.ticker == ticker) {
            instrument.last_price = price;
            instrument.updated_at = Utc::now();
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(&self, account: &NewAccount) -> Result<UserAccount, AccountError> {
        let mut state = self.state.lock().await;
        if state.accounts.iter().any(|a| a.username == account.username) {
            return Err(AccountError::DuplicateUsername(account.username.clone()));
        }

        let created = UserAccount {
            id: state.accounts.len() as UserId + 1,
            username: account.username.clone(),
            credential: account.credential.clone(),
            balance: account.balance,
            created_at: Utc::now(),
        };
        state.accounts.push(created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state.accounts.iter().find(|a| a.id == id).cloned())
    }
}

#[async_trait]
impl InstrumentRepository for InMemoryStore {
    async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Instrument>> {
        let state = self.state.lock().await;
        Ok(state.instruments.iter().find(|i| i.ticker == ticker).cloned())
    }

    async fn list(&self) -> Result<Vec<Instrument>> {
        let state = self.state.lock().await;
        let mut instruments = state.instruments.clone();
        instruments.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(instruments)
    }

    async fn insert(&self, draft: &InstrumentDraft) -> Result<Instrument, CatalogError> {
        let mut state = self.state.lock().await;
        if state.instruments.iter().any(|i| i.ticker == draft.ticker) {
            return Err(CatalogError::DuplicateTicker(draft.ticker.clone()));
        }

        let instrument = Instrument {
            id: state.instruments.len() as InstrumentId + 1,
            ticker: draft.ticker.clone(),
            name: draft.name.clone(),
            last_price: draft.last_price,
            updated_at: Utc::now(),
        };
        state.instruments.push(instrument.clone());
        Ok(instrument)
    }

    async fn upsert_batch(&self, drafts: &[InstrumentDraft]) -> Result<UpsertOutcome> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let mut outcome = UpsertOutcome::default();

        for draft in drafts {
            if let Some(existing) = state.instruments.iter_mut().find(|i| i.ticker == draft.ticker) {
                existing.name = draft.name.clone();
                existing.last_price = draft.last_price;
                existing.updated_at = now;
                outcome.updated += 1;
            } else {
                let id = state.instruments.len() as InstrumentId + 1;
                state.instruments.push(Instrument {
                    id,
                    ticker: draft.ticker.clone(),
                    name: draft.name.clone(),
                    last_price: draft.last_price,
                    updated_at: now,
                });
                outcome.created += 1;
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn settle(&self, order: &OrderTicket) -> Result<TransactionRecord, LedgerError> {
        let mut state = self.state.lock().await;

        let account = state
            .accounts
            .iter()
            .find(|a| a.id == order.user_id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(order.user_id))?;
        let instrument = state
            .instruments
            .iter()
            .find(|i| i.id == order.instrument_id)
            .cloned()
            .ok_or_else(|| LedgerError::InstrumentNotFound(order.instrument_id.to_string()))?;

        let holdings = clamp_holding(state.net_volume(order.user_id, order.instrument_id));

        let settlement = settle(&SettlementInput {
            ticker: &instrument.ticker,
            side: order.side,
            volume: order.volume,
            price: instrument.last_price,
            balance: account.balance,
            holdings,
        })?;

        if let Some(stored) = state.accounts.iter_mut().find(|a| a.id == order.user_id) {
            stored.balance = settlement.new_balance;
        }

        let record = TransactionRecord {
            id: state.transactions.len() as i64 + 1,
            user_id: order.user_id,
            instrument_id: order.instrument_id,
            username: account.username,
            ticker: instrument.ticker,
            side: order.side,
            volume: order.volume,
            execution_price: settlement.execution_price,
            created_at: Utc::now(),
        };
        state.transactions.push(record.clone());

        Ok(record)
    }

    async fn net_volume(&self, user_id: UserId, instrument_id: InstrumentId) -> Result<i64> {
        Ok(self.state.lock().await.net_volume(user_id, instrument_id))
    }

    async fn net_volumes_by_ticker(&self, user_id: UserId) -> Result<Vec<(String, i64)>> {
        let state = self.state.lock().await;

        let tickers: HashMap<InstrumentId, &str> = state
            .instruments
            .iter()
            .map(|i| (i.id, i.ticker.as_str()))
            .collect();

        let mut nets: BTreeMap<String, i64> = BTreeMap::new();
        for t in state.transactions.iter().filter(|t| t.user_id == user_id) {
            if let Some(ticker) = tickers.get(&t.instrument_id) {
                *nets.entry((*ticker).to_string()).or_default() += t.side.signed(t.volume);
            }
        }

        Ok(nets.into_iter().collect())
    }

    async fn history(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| range.is_none_or(|r| r.contains(t.created_at)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::types::OrderSide;
    use rust_decimal_macros::dec;

    async fn seeded() -> (InMemoryStore, UserAccount, Instrument) {
        let store = InMemoryStore::new();
        let account = store
            .create(&NewAccount {
                username: "alice".to_string(),
                credential: "hash".to_string(),
                balance: dec!(1000),
            })
            .await
            .unwrap();
        let instrument = store
            .insert(&InstrumentDraft::new("BTC", "Bitcoin", dec!(50)))
            .await
            .unwrap();
        (store, account, instrument)
    }

    #[tokio::test]
    async fn test_settle_buy_updates_balance_and_history() {
        let (store, account, instrument) = seeded().await;

        let record = store
            .settle(&OrderTicket {
                user_id: account.id,
                instrument_id: instrument.id,
                side: OrderSide::Buy,
                volume: 10,
            })
            .await
            .unwrap();

        assert_eq!(record.execution_price, dec!(500));
        assert_eq!(record.username, "alice");
        assert_eq!(record.ticker, "BTC");

        let reloaded = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, dec!(500));
        assert_eq!(store.net_volume(account.id, instrument.id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_rejected_settle_leaves_state_untouched() {
        let (store, account, instrument) = seeded().await;

        let err = store
            .settle(&OrderTicket {
                user_id: account.id,
                instrument_id: instrument.id,
                side: OrderSide::Sell,
                volume: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientHoldings { available: 0, .. }));

        let reloaded = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, dec!(1000));
        assert!(store.history(account.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_are_rejected() {
        let (store, _, _) = seeded().await;

        let err = store
            .insert(&InstrumentDraft::new("btc", "Other", dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTicker(ref t) if t == "BTC"));

        let err = store
            .create(&NewAccount {
                username: "alice".to_string(),
                credential: "x".to_string(),
                balance: dec!(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateUsername(_)));
    }

    #[tokio::test]
    async fn test_upsert_batch_counts_created_and_updated() {
        let (store, _, _) = seeded().await;

        let outcome = store
            .upsert_batch(&[
                InstrumentDraft::new("BTC", "Bitcoin", dec!(60)),
                InstrumentDraft::new("ETH", "Ethereum", dec!(3)),
            ])
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome { created: 1, updated: 1 });
        let btc = store.find_by_ticker("BTC").await.unwrap().unwrap();
        assert_eq!(btc.last_price, dec!(60));
    }
}
