//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `Default` implementations below
//! 2. **Config file**: TOML file named by the `GATEWAY_CONFIG` env var (default
//!    `config/gateway.toml`), optional
//! 3. **Environment variables**: `GATEWAY__SECTION__FIELD`, e.g.
//!    `GATEWAY__ENDPOINTS__LIVE_URL=https://...`
//!
//! # Configuration Sections
//!
//! - [`EndpointsConfig`]: Delayed and Live GraphQL URLs
//! - [`RoutingConfig`]: feature map overrides
//! - [`HealthCheckConfig`]: probe cadence, timeout, penalties
//! - [`CacheConfig`]: durable database and the two cache instances
//! - [`PipelineConfig`]: query TTL, slow query threshold, routing mode
//! - [`HttpClientConfig`]: transport concurrency and timeouts
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [endpoints]
//! delayed_url = "https://api.studio.thegraph.com/query/1/dataset/v1"
//! live_url = "https://gateway.thegraph.com/api/subgraphs/id/abc"
//!
//! [routing.features]
//! statistics = "live"
//!
//! [pipeline]
//! routing_mode = "optimal"
//! ```

use crate::{
    cache::{CacheConfig, TierConfig},
    endpoint::{probe::DEFAULT_SAMPLE_SELECTION, HttpClientConfig},
    types::{EndpointId, EndpointSet},
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, time::Duration};

/// URLs of the two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Rate-limited endpoint lagging the chain head.
    pub delayed_url: String,
    /// Near real-time endpoint.
    pub live_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            delayed_url: "https://api.studio.thegraph.com/query/115633/dungeon-delvers/v3.1.1"
                .to_string(),
            live_url: "https://gateway.thegraph.com/api/subgraphs/id/Hmwr7XYgzVzsUb9dw95gSGJ1Vof6qYypuvCxynzinCjs"
                .to_string(),
        }
    }
}

/// Feature routing overrides, merged over the built-in map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub features: HashMap<String, EndpointId>,
}

/// Endpoint probing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Minimum age of the last probe round before an on-demand refresh (default: 120)
    pub refresh_interval_seconds: u64,
    /// Enforced probe timeout (default: 8)
    pub probe_timeout_seconds: u64,
    /// Blocks an endpoint may trail its sibling before being penalized (default: 1000)
    pub block_lag_threshold: u64,
    /// Latency added for indexing errors or staleness (default: 8000)
    pub penalty_ms: u64,
    /// Latency reported for unusable endpoints (default: 9999)
    pub sentinel_ms: u64,
    /// Entity selection appended to the `_meta` probe query
    pub sample_selection: String,
    /// Run the background refresh task (default: true)
    pub background: bool,
    /// Probe outcomes retained per endpoint (default: 100)
    pub history_size: usize,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 120,
            probe_timeout_seconds: 8,
            block_lag_threshold: 1000,
            penalty_ms: 8000,
            sentinel_ms: 9999,
            sample_selection: DEFAULT_SAMPLE_SELECTION.to_string(),
            background: true,
            history_size: 100,
        }
    }
}

impl HealthCheckConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

/// How the query pipeline picks an endpoint for each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Feature map lookup.
    #[default]
    Static,
    /// Currently fastest healthy endpoint.
    Optimal,
}

/// Query pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// TTL for cached query results when the caller gives none (default: 300)
    pub default_ttl_seconds: u64,
    /// Queries slower than this are logged at warn (default: 1000)
    pub slow_query_threshold_ms: u64,
    pub routing_mode: RoutingMode,
    /// Coalesce concurrent identical cache misses (default: true)
    pub dedupe_inflight: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 300,
            slow_query_threshold_ms: 1000,
            routing_mode: RoutingMode::Static,
            dedupe_inflight: true,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    #[must_use]
    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms)
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub http: HttpClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; compiled defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("GATEWAY").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Loads from `GATEWAY_CONFIG`, defaulting to `config/gateway.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("GATEWAY_CONFIG").unwrap_or_else(|_| "config/gateway.toml".to_string());
        Self::from_file(&config_path)
    }

    #[must_use]
    pub fn endpoint_set(&self) -> EndpointSet {
        EndpointSet::new(&self.endpoints.delayed_url, &self.endpoints.live_url)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in
            [("delayed_url", &self.endpoints.delayed_url), ("live_url", &self.endpoints.live_url)]
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("endpoints.{name} must be an http(s) URL"));
            }
        }
        if self.endpoints.delayed_url == self.endpoints.live_url {
            return Err("Delayed and Live endpoints must be distinct".to_string());
        }

        let health = &self.health_check;
        if health.refresh_interval_seconds == 0 {
            return Err("health_check.refresh_interval_seconds must be greater than 0".to_string());
        }
        if health.probe_timeout_seconds == 0 {
            return Err("health_check.probe_timeout_seconds must be greater than 0".to_string());
        }
        if health.sample_selection.trim().is_empty() {
            return Err("health_check.sample_selection must select at least one entity".to_string());
        }
        if health.history_size == 0 {
            return Err("health_check.history_size must be greater than 0".to_string());
        }

        for (name, tier) in [("metadata", &self.cache.metadata), ("queries", &self.cache.queries)] {
            validate_tier(name, tier)?;
        }
        if self.cache.metadata.table == self.cache.queries.table {
            return Err("cache.metadata and cache.queries must use different tables".to_string());
        }

        if self.pipeline.default_ttl_seconds == 0 {
            return Err("pipeline.default_ttl_seconds must be greater than 0".to_string());
        }
        if self.http.concurrent_limit == 0 {
            return Err("http.concurrent_limit must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}

fn validate_tier(name: &str, tier: &TierConfig) -> Result<(), String> {
    if tier.max_memory_items == 0 {
        return Err(format!("cache.{name}.max_memory_items must be greater than 0"));
    }
    if tier.default_ttl_seconds == 0 {
        return Err(format!("cache.{name}.default_ttl_seconds must be greater than 0"));
    }
    if tier.table.is_empty() || !tier.table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("cache.{name}.table must match [A-Za-z0-9_]+"));
    }
    Ok(())
}
