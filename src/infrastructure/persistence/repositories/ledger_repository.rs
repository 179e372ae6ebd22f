use super::{decimal_column, now_millis};
use crate::domain::errors::LedgerError;
use crate::domain::repositories::LedgerRepository;
use crate::domain::trading::holdings::clamp_holding;
use crate::domain::trading::settlement::{SettlementInput, settle};
use crate::domain::trading::types::{
    DateRange, InstrumentId, OrderSide, OrderTicket, TransactionRecord, UserId,
    timestamp_from_millis,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Executor, Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

const NET_VOLUME_SQL: &str = r#"
    SELECT COALESCE(SUM(CASE side WHEN 'BUY' THEN volume ELSE -volume END), 0) AS net
    FROM transactions
    WHERE user_id = ? AND instrument_id = ?
"#;

pub struct SqliteLedgerRepository {
    pool: SqlitePool,
}

impl SqliteLedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<TransactionRecord> {
        let side_str: String = row.try_get("side")?;
        let side = OrderSide::from_str(&side_str)?;
        let volume: i64 = row.try_get("volume")?;

        Ok(TransactionRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            instrument_id: row.try_get("instrument_id")?,
            username: row.try_get("username")?,
            ticker: row.try_get("ticker")?,
            side,
            volume: u64::try_from(volume).context("Negative volume in ledger")?,
            execution_price: decimal_column(row, "execution_price")?,
            created_at: timestamp_from_millis(row.try_get("created_at")?),
        })
    }
}

async fn net_volume_with<'e, E>(executor: E, user_id: UserId, instrument_id: InstrumentId) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(NET_VOLUME_SQL)
        .bind(user_id)
        .bind(instrument_id)
        .fetch_one(executor)
        .await
        .context("Failed to aggregate holdings")?;

    Ok(row.try_get("net")?)
}

#[async_trait]
impl LedgerRepository for SqliteLedgerRepository {
    async fn settle(&self, order: &OrderTicket) -> Result<TransactionRecord, LedgerError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open ledger transaction")
            .map_err(LedgerError::CommitFailed)?;

        // Claiming the account row is a write, so SQLite hands this transaction
        // the write lock before balance or holdings are read. Concurrent orders
        // wait here and then see committed state.
        let account = sqlx::query(
            "UPDATE accounts SET version = version + 1 WHERE id = ? RETURNING username, balance",
        )
        .bind(order.user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to lock account")
        .map_err(LedgerError::CommitFailed)?;

        let Some(account) = account else {
            return Err(LedgerError::AccountNotFound(order.user_id));
        };
        let username: String = account
            .try_get("username")
            .context("Missing username")
            .map_err(LedgerError::CommitFailed)?;
        let balance = decimal_column(&account, "balance").map_err(LedgerError::CommitFailed)?;

        let instrument = sqlx::query("SELECT ticker, last_price FROM instruments WHERE id = ?")
            .bind(order.instrument_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to load instrument")
            .map_err(LedgerError::CommitFailed)?;

        let Some(instrument) = instrument else {
            return Err(LedgerError::InstrumentNotFound(order.instrument_id.to_string()));
        };
        let ticker: String = instrument
            .try_get("ticker")
            .context("Missing ticker")
            .map_err(LedgerError::CommitFailed)?;
        let price = decimal_column(&instrument, "last_price").map_err(LedgerError::CommitFailed)?;

        let holdings = match order.side {
            OrderSide::Buy => 0,
            OrderSide::Sell => clamp_holding(
                net_volume_with(&mut *tx, order.user_id, order.instrument_id)
                    .await
                    .map_err(LedgerError::CommitFailed)?,
            ),
        };

        let settlement = settle(&SettlementInput {
            ticker: &ticker,
            side: order.side,
            volume: order.volume,
            price,
            balance,
            holdings,
        })?;

        sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
            .bind(settlement.new_balance.to_string())
            .bind(order.user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to update balance")
            .map_err(LedgerError::CommitFailed)?;

        let created_at = now_millis();
        let volume = i64::try_from(order.volume)
            .context("Volume out of range")
            .map_err(LedgerError::CommitFailed)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO transactions (user_id, instrument_id, side, volume, execution_price, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(order.instrument_id)
        .bind(order.side.as_str())
        .bind(volume)
        .bind(settlement.execution_price.to_string())
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert transaction")
        .map_err(LedgerError::CommitFailed)?;

        let id: i64 = inserted
            .try_get("id")
            .context("Missing transaction id")
            .map_err(LedgerError::CommitFailed)?;

        tx.commit()
            .await
            .context("Failed to commit ledger transaction")
            .map_err(LedgerError::CommitFailed)?;

        info!(
            "{} {} x{} committed for {} at {}",
            order.side, ticker, order.volume, username, settlement.execution_price
        );

        Ok(TransactionRecord {
            id,
            user_id: order.user_id,
            instrument_id: order.instrument_id,
            username,
            ticker,
            side: order.side,
            volume: order.volume,
            execution_price: settlement.execution_price,
            created_at: timestamp_from_millis(created_at),
        })
    }

    async fn net_volume(&self, user_id: UserId, instrument_id: InstrumentId) -> Result<i64> {
        net_volume_with(&self.pool, user_id, instrument_id).await
    }

    async fn net_volumes_by_ticker(&self, user_id: UserId) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT i.ticker AS ticker,
                   SUM(CASE t.side WHEN 'BUY' THEN t.volume ELSE -t.volume END) AS net
            FROM transactions t
            JOIN instruments i ON i.id = t.instrument_id
            WHERE t.user_id = ?
            GROUP BY i.ticker
            ORDER BY i.ticker ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate holdings by ticker")?;

        rows.iter()
            .map(|row| Ok((row.try_get("ticker")?, row.try_get("net")?)))
            .collect()
    }

    async fn history(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRecord>> {
        let start = range.and_then(|r| r.start).map(|t| t.timestamp_millis());
        let end = range.and_then(|r| r.end).map(|t| t.timestamp_millis());

        let rows = sqlx::query(
            r#"
            SELECT t.id, t.user_id, t.instrument_id, a.username, i.ticker,
                   t.side, t.volume, t.execution_price, t.created_at
            FROM transactions t
            JOIN accounts a ON a.id = t.user_id
            JOIN instruments i ON i.id = t.instrument_id
            WHERE t.user_id = ?
              AND (? IS NULL OR t.created_at >= ?)
              AND (? IS NULL OR t.created_at <= ?)
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load transaction history")?;

        rows.iter().map(Self::map_row).collect()
    }
}
