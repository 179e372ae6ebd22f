use crate::domain::errors::AccountError;
use crate::domain::trading::types::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Balance-bearing principal. The balance only changes inside a settled order.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub credential: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Validated registration data; `credential` is already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub username: String,
    pub credential: String,
    pub balance: Decimal,
}

/// Registration input before hashing
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub balance: Decimal,
}

impl Registration {
    /// Checks everything that does not need storage or hashing.
    pub fn validate(&self) -> Result<String, AccountError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AccountError::InvalidUsername);
        }
        if self.password.is_empty() {
            return Err(AccountError::InvalidPassword);
        }
        if self.balance <= Decimal::ZERO {
            return Err(AccountError::InvalidInitialBalance(self.balance));
        }
        Ok(username.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub balance: Decimal,
    pub holdings: BTreeMap<String, u64>,
}
