//! Configuration module for tradedesk.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Feed, Auth, and Observability.

mod auth_config;
mod feed_config;
mod observability_config;
mod server_config;

pub use auth_config::{AuthEnvConfig, DEV_JWT_SECRET};
pub use feed_config::FeedEnvConfig;
pub use observability_config::{LogFormat, ObservabilityEnvConfig};
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tradedesk.db";

/// Reads a variable by name. `from_env` passes the process environment,
/// tests pass a map.
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parses `key` when set, `default` otherwise. A set but unparsable value is
/// an error rather than a silent fallback.
pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}={:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

pub(crate) fn string_or(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server: ServerEnvConfig,
    pub feed: FeedEnvConfig,
    pub auth: AuthEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            server: ServerEnvConfig::default(),
            feed: FeedEnvConfig::default(),
            auth: AuthEnvConfig::default(),
            observability: ObservabilityEnvConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            database_url: string_or(lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            server: ServerEnvConfig::from_lookup(lookup).context("Failed to load server config")?,
            feed: FeedEnvConfig::from_lookup(lookup).context("Failed to load feed config")?,
            auth: AuthEnvConfig::from_lookup(lookup).context("Failed to load auth config")?,
            observability: ObservabilityEnvConfig::from_lookup(lookup)
                .context("Failed to load observability config")?,
        })
    }
}
