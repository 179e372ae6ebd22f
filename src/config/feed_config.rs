//! Market-data feed configuration parsing from environment variables.
//!
//! This module handles the CoinGecko endpoint, request bounds, cache TTL and
//! how many entries each kind of sync pulls.

use super::{Lookup, parse_or, string_or};
use anyhow::Result;
use std::time::Duration;

/// Recovery syncs must see at least this many entries
pub const MIN_RECOVERY_COUNT: u32 = 250;

#[derive(Debug, Clone)]
pub struct FeedEnvConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub max_retries: u32,
    pub default_currency: String,
    /// Entries pulled by the manual and top-20 syncs
    pub sync_count: u32,
    /// Entries pulled when an unknown ticker is resolved
    pub recovery_count: u32,
    /// Entries shown by the top-20 listing
    pub display_count: usize,
}

impl Default for FeedEnvConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            timeout_secs: 15,
            cache_ttl_secs: 3600,
            max_retries: 0,
            default_currency: "usd".to_string(),
            sync_count: 100,
            recovery_count: MIN_RECOVERY_COUNT,
            display_count: 20,
        }
    }
}

impl FeedEnvConfig {
    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            base_url: string_or(lookup, "FEED_BASE_URL", &defaults.base_url),
            timeout_secs: parse_or(lookup, "FEED_TIMEOUT_SECS", defaults.timeout_secs)?,
            cache_ttl_secs: parse_or(lookup, "FEED_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            max_retries: parse_or(lookup, "FEED_MAX_RETRIES", defaults.max_retries)?,
            default_currency: string_or(lookup, "FEED_DEFAULT_CURRENCY", &defaults.default_currency)
                .to_lowercase(),
            sync_count: parse_or(lookup, "FEED_SYNC_COUNT", defaults.sync_count)?,
            recovery_count: parse_or(lookup, "FEED_RECOVERY_COUNT", defaults.recovery_count)?
                .max(MIN_RECOVERY_COUNT),
            display_count: parse_or(lookup, "FEED_DISPLAY_COUNT", defaults.display_count)?,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
