use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::repositories::{AccountRepository, InstrumentRepository, LedgerRepository};
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::repositories::{
    SqliteAccountRepository, SqliteInstrumentRepository, SqliteLedgerRepository,
};
use crate::infrastructure::repositories::InMemoryStore;

pub struct PersistenceHandle {
    /// `None` when running on the in-memory store
    pub db: Option<Database>,
    pub account_repository: Arc<dyn AccountRepository>,
    pub instrument_repository: Arc<dyn InstrumentRepository>,
    pub ledger_repository: Arc<dyn LedgerRepository>,
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    pub async fn init(db_url: &str) -> Result<PersistenceHandle> {
        info!("Initializing Database at {}", db_url);

        let db = Database::new(db_url)
            .await
            .context("Failed to initialize database")?;

        Ok(Self::from_database(db))
    }

    pub fn from_database(db: Database) -> PersistenceHandle {
        let account_repo = Arc::new(SqliteAccountRepository::new(db.pool.clone()));
        let instrument_repo = Arc::new(SqliteInstrumentRepository::new(db.pool.clone()));
        let ledger_repo = Arc::new(SqliteLedgerRepository::new(db.pool.clone()));

        PersistenceHandle {
            db: Some(db),
            account_repository: account_repo,
            instrument_repository: instrument_repo,
            ledger_repository: ledger_repo,
        }
    }

    /// All three repositories backed by one shared `InMemoryStore`
    pub fn in_memory(store: InMemoryStore) -> PersistenceHandle {
        PersistenceHandle {
            db: None,
            account_repository: Arc::new(store.clone()),
            instrument_repository: Arc::new(store.clone()),
            ledger_repository: Arc::new(store),
        }
    }
}
