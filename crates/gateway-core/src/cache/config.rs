//! Configuration for the tiered caches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-instance cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Durable table name. Must be a plain SQL identifier.
    pub table: String,
    /// Memory tier capacity (default: 1000)
    pub max_memory_items: usize,
    /// TTL applied when `set` is called without one (default: 1800 = 30 minutes)
    pub default_ttl_seconds: u64,
}

impl TierConfig {
    /// Slowly-changing token metadata: 500 items, 7 days.
    #[must_use]
    pub fn metadata_defaults() -> Self {
        Self { table: "metadata".to_string(), max_memory_items: 500, default_ttl_seconds: 7 * 24 * 3600 }
    }

    /// Query results: 100 items, 5 minutes.
    #[must_use]
    pub fn query_defaults() -> Self {
        Self { table: "queries".to_string(), max_memory_items: 100, default_ttl_seconds: 300 }
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self { table: "cache".to_string(), max_memory_items: 1000, default_ttl_seconds: 1800 }
    }
}

/// Settings for both cache instances and their shared durable database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `SQLite` URL for the durable tier. `None` runs both caches memory-only.
    pub database_url: Option<String>,
    pub metadata: TierConfig,
    pub queries: TierConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_url: Some("sqlite://./db/gateway-cache.db?mode=rwc".to_string()),
            metadata: TierConfig::metadata_defaults(),
            queries: TierConfig::query_defaults(),
        }
    }
}
