use crate::application::portfolio::HoldingsCalculator;
use crate::application::trading::TransactionLedger;
use crate::domain::account::{NewAccount, Registration, UserAccount, UserProfile};
use crate::domain::errors::{AccountError, AuthError};
use crate::domain::ports::{AuthProvider, IssuedToken};
use crate::domain::repositories::AccountRepository;
use crate::domain::trading::types::{DateRange, TransactionRecord};
use std::sync::Arc;
use tracing::info;

/// Registration, login and per-user read models.
///
/// Balances are never written here; only the ledger's settle path changes them.
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    holdings: Arc<HoldingsCalculator>,
    ledger: Arc<TransactionLedger>,
    auth: Arc<dyn AuthProvider>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        holdings: Arc<HoldingsCalculator>,
        ledger: Arc<TransactionLedger>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            accounts,
            holdings,
            ledger,
            auth,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<UserAccount, AccountError> {
        let username = registration.validate()?;

        let credential = self.hash_password(&registration.password).await?;
        let account = self
            .accounts
            .create(&NewAccount {
                username,
                credential,
                balance: registration.balance,
            })
            .await?;

        info!(
            "AccountService: registered {} with balance {}",
            account.username, account.balance
        );
        Ok(account)
    }

    /// Unknown users and wrong passwords fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AccountError> {
        let account = self
            .accounts
            .find_by_username(username.trim())
            .await
            .map_err(AccountError::Storage)?;

        match account {
            Some(account) if self.verify_password(password, &account.credential).await? => {
                Ok(self.auth.issue_token(&account.username)?)
            }
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }

    // Argon2 is CPU-bound, keep it off the runtime workers
    async fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let auth = self.auth.clone();
        let password = password.to_string();
        let credential = tokio::task::spawn_blocking(move || auth.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))??;
        Ok(credential)
    }

    async fn verify_password(&self, password: &str, credential: &str) -> Result<bool, AccountError> {
        let auth = self.auth.clone();
        let password = password.to_string();
        let credential = credential.to_string();
        tokio::task::spawn_blocking(move || auth.verify(&password, &credential))
            .await
            .map_err(|e| {
                AuthError::Internal(format!("Password verification task failed: {}", e)).into()
            })
    }

    /// Resolves a bearer token to its account.
    pub async fn authenticate(&self, token: &str) -> Result<UserAccount, AccountError> {
        let identity = self.auth.current_user(token)?;

        self.accounts
            .find_by_username(&identity)
            .await
            .map_err(AccountError::Storage)?
            .ok_or_else(|| {
                AuthError::Unauthenticated(format!("Account {} no longer exists", identity)).into()
            })
    }

    pub async fn profile(&self, identity: &str, username: &str) -> Result<UserProfile, AccountError> {
        let account = self.authorized_account(identity, username).await?;
        let holdings = self
            .holdings
            .all_holdings_for(account.id)
            .await
            .map_err(AccountError::Storage)?;

        Ok(UserProfile {
            id: account.id,
            username: account.username,
            balance: account.balance,
            holdings,
        })
    }

    pub async fn transactions(
        &self,
        identity: &str,
        username: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRecord>, AccountError> {
        let account = self.authorized_account(identity, username).await?;
        self.ledger
            .history(account.id, range)
            .await
            .map_err(AccountError::Storage)
    }

    async fn authorized_account(
        &self,
        identity: &str,
        username: &str,
    ) -> Result<UserAccount, AccountError> {
        if identity != username {
            return Err(AccountError::Forbidden(username.to_string()));
        }

        self.accounts
            .find_by_username(username)
            .await
            .map_err(AccountError::Storage)?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))
    }
}
