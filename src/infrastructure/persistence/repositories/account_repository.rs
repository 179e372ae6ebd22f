use super::{decimal_column, is_unique_violation, now_millis};
use crate::domain::account::{NewAccount, UserAccount};
use crate::domain::errors::AccountError;
use crate::domain::repositories::AccountRepository;
use crate::domain::trading::types::{UserId, timestamp_from_millis};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<UserAccount> {
        Ok(UserAccount {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            credential: row.try_get("credential")?,
            balance: decimal_column(row, "balance")?,
            created_at: timestamp_from_millis(row.try_get("created_at")?),
        })
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, account: &NewAccount) -> Result<UserAccount, AccountError> {
        let created_at = now_millis();

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (username, credential, balance, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&account.username)
        .bind(&account.credential)
        .bind(account.balance.to_string())
        .bind(created_at)
        .fetch_one(&self.pool)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(err) if is_unique_violation(&err) => {
                return Err(AccountError::DuplicateUsername(account.username.clone()));
            }
            Err(err) => {
                return Err(AccountError::Storage(
                    anyhow::Error::new(err).context("Failed to insert account"),
                ));
            }
        };

        let id: i64 = row
            .try_get("id")
            .context("Missing account id")
            .map_err(AccountError::Storage)?;

        info!("Persisted Account {} ({})", account.username, id);

        Ok(UserAccount {
            id,
            username: account.username.clone(),
            credential: account.credential.clone(),
            balance: account.balance,
            created_at: timestamp_from_millis(created_at),
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load account")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load account")?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
