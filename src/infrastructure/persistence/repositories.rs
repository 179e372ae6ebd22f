mod account_repository;
mod instrument_repository;
mod ledger_repository;

pub use account_repository::SqliteAccountRepository;
pub use instrument_repository::SqliteInstrumentRepository;
pub use ledger_repository::SqliteLedgerRepository;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::str::FromStr;

/// Decimals are stored as TEXT. A value that does not parse is corruption and
/// is reported, never replaced by zero.
fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).with_context(|| format!("Corrupt decimal in column {column}: {raw}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
