//! Token signing configuration parsing from environment variables.

use super::{Lookup, parse_or, string_or};
use anyhow::Result;

/// Placeholder secret used when `JWT_SECRET` is unset. Fine for local runs only.
pub const DEV_JWT_SECRET: &str = "tradedesk-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AuthEnvConfig {
    pub jwt_secret: String,
    pub token_expire_minutes: i64,
}

impl Default for AuthEnvConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_expire_minutes: 30,
        }
    }
}

impl AuthEnvConfig {
    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let token_expire_minutes = parse_or(
            lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            defaults.token_expire_minutes,
        )?;
        if token_expire_minutes <= 0 {
            anyhow::bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be positive, got {}",
                token_expire_minutes
            );
        }

        Ok(Self {
            jwt_secret: string_or(lookup, "JWT_SECRET", &defaults.jwt_secret),
            token_expire_minutes,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_expire_minutes)
    }
}
