use crate::domain::errors::{AuthError, FeedError};
use crate::domain::market::quote::FeedQuote;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source of current market prices
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Top `count` instruments by market cap, priced in `currency`.
    async fn fetch_markets(&self, currency: &str, count: u32) -> Result<Vec<FeedQuote>, FeedError>;
}

/// Access token handed to a client after login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Credential hashing and token issuance
pub trait AuthProvider: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    fn verify(&self, password: &str, credential: &str) -> bool;

    fn issue_token(&self, identity: &str) -> Result<IssuedToken, AuthError>;

    /// Resolves the identity a token was issued for.
    fn current_user(&self, token: &str) -> Result<String, AuthError>;
}
