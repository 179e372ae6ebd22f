//! Repository Pattern Abstractions
//!
//! Storage seams for the ledger. Business rules stay in the domain and
//! application layers; implementations only provide lookups and atomic units
//! of work.
//!
//! # Implementations
//!
//! - `Sqlite*Repository` in `infrastructure::persistence` (production)
//! - `InMemoryStore` in `infrastructure::repositories` (tests, single process)
//!
//! # Atomicity
//!
//! `InstrumentRepository::upsert_batch` and `LedgerRepository::settle` each run
//! as a single transaction. Either everything they write becomes visible, or
//! nothing does.

use crate::domain::account::{NewAccount, UserAccount};
use crate::domain::errors::{AccountError, CatalogError, LedgerError};
use crate::domain::market::instrument::{Instrument, InstrumentDraft, UpsertOutcome};
use crate::domain::trading::types::{
    DateRange, InstrumentId, OrderTicket, TransactionRecord, UserId,
};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `DuplicateUsername` when the username is taken
    async fn create(&self, account: &NewAccount) -> Result<UserAccount, AccountError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>>;
}

#[async_trait]
pub trait InstrumentRepository: Send + Sync {
    async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Instrument>>;

    async fn list(&self) -> Result<Vec<Instrument>>;

    /// Fails with `DuplicateTicker` when the ticker is taken
    async fn insert(&self, draft: &InstrumentDraft) -> Result<Instrument, CatalogError>;

    /// Inserts new tickers and overwrites name and price of existing ones,
    /// all in one transaction. Drafts must already be deduplicated.
    async fn upsert_batch(&self, drafts: &[InstrumentDraft]) -> Result<UpsertOutcome>;
}

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Validates the order against committed state and records it, in one
    /// isolated transaction that serializes orders of the same account.
    async fn settle(&self, order: &OrderTicket) -> Result<TransactionRecord, LedgerError>;

    /// Σ BUY − Σ SELL for one account and instrument (may be negative only if
    /// the history was written outside `settle`)
    async fn net_volume(&self, user_id: UserId, instrument_id: InstrumentId) -> Result<i64>;

    /// Net volume per ticker for one account, computed in a single grouped pass
    async fn net_volumes_by_ticker(&self, user_id: UserId) -> Result<Vec<(String, i64)>>;

    /// Transactions of one account, oldest first
    async fn history(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRecord>>;
}
