use super::{decimal_column, is_unique_violation, now_millis};
use crate::domain::errors::CatalogError;
use crate::domain::market::instrument::{Instrument, InstrumentDraft, UpsertOutcome};
use crate::domain::repositories::InstrumentRepository;
use crate::domain::trading::types::timestamp_from_millis;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

pub struct SqliteInstrumentRepository {
    pool: SqlitePool,
}

impl SqliteInstrumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Instrument> {
        Ok(Instrument {
            id: row.try_get("id")?,
            ticker: row.try_get("ticker")?,
            name: row.try_get("name")?,
            last_price: decimal_column(row, "last_price")?,
            updated_at: timestamp_from_millis(row.try_get("updated_at")?),
        })
    }
}

#[async_trait]
impl InstrumentRepository for SqliteInstrumentRepository {
    async fn find_by_ticker(&self, ticker: &str) -> Result<Option<Instrument>> {
        let row = sqlx::query("SELECT * FROM instruments WHERE ticker = ?")
            .bind(ticker)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load instrument")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Instrument>> {
        let rows = sqlx::query("SELECT * FROM instruments ORDER BY ticker ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list instruments")?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn insert(&self, draft: &InstrumentDraft) -> Result<Instrument, CatalogError> {
        let updated_at = now_millis();

        let result = sqlx::query(
            r#"
            INSERT INTO instruments (ticker, name, last_price, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&draft.ticker)
        .bind(&draft.name)
        .bind(draft.last_price.to_string())
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(err) if is_unique_violation(&err) => {
                return Err(CatalogError::DuplicateTicker(draft.ticker.clone()));
            }
            Err(err) => {
                return Err(CatalogError::Storage(
                    anyhow::Error::new(err).context("Failed to insert instrument"),
                ));
            }
        };

        let id: i64 = row
            .try_get("id")
            .context("Missing instrument id")
            .map_err(CatalogError::Storage)?;

        info!("Persisted Instrument {} ({})", draft.ticker, draft.name);

        Ok(Instrument {
            id,
            ticker: draft.ticker.clone(),
            name: draft.name.clone(),
            last_price: draft.last_price,
            updated_at: timestamp_from_millis(updated_at),
        })
    }

    async fn upsert_batch(&self, drafts: &[InstrumentDraft]) -> Result<UpsertOutcome> {
        let updated_at = now_millis();
        let mut outcome = UpsertOutcome::default();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open sync transaction")?;

        for draft in drafts {
            // Writing first takes the database write lock before anything is read
            let updated = sqlx::query(
                "UPDATE instruments SET name = ?, last_price = ?, updated_at = ? WHERE ticker = ?",
            )
            .bind(&draft.name)
            .bind(draft.last_price.to_string())
            .bind(updated_at)
            .bind(&draft.ticker)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to update instrument {}", draft.ticker))?;

            if updated.rows_affected() > 0 {
                outcome.updated += 1;
                continue;
            }

            sqlx::query(
                "INSERT INTO instruments (ticker, name, last_price, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&draft.ticker)
            .bind(&draft.name)
            .bind(draft.last_price.to_string())
            .bind(updated_at)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert instrument {}", draft.ticker))?;

            outcome.created += 1;
        }

        tx.commit().await.context("Failed to commit sync transaction")?;

        Ok(outcome)
    }
}
