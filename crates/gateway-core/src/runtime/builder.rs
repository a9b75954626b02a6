//! Builder for initializing the gateway runtime.

use crate::{
    cache::TieredCache,
    config::{AppConfig, RoutingMode},
    endpoint::{
        EndpointResolver, EndpointSelector, FeatureRoutingPolicy, GraphQLTransport, HealthMonitor,
        HttpClient, OptimalRouting, StaticRouting,
    },
    pipeline::{build_pipeline, QueryClient},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::lifecycle::GatewayRuntime;

/// Errors that can occur during runtime initialization.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// HTTP transport could not be created
    #[error("Transport initialization failed: {0}")]
    Transport(String),
}

const SHUTDOWN_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
struct RuntimeOptions {
    enable_health_monitor: Option<bool>,
    enable_durable_cache: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self { enable_health_monitor: None, enable_durable_cache: true }
    }
}

/// Builder for constructing a [`GatewayRuntime`].
///
/// ```no_run
/// # use gateway_core::{config::AppConfig, runtime::GatewayRuntime};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let runtime = GatewayRuntime::builder()
///     .with_config(AppConfig::load()?)
///     .disable_health_monitor()
///     .build()
///     .await?;
///
/// let url = runtime.query_client().optimal_endpoint_url().await;
/// runtime.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct GatewayRuntimeBuilder {
    config: Option<AppConfig>,
    transport: Option<Arc<dyn GraphQLTransport>>,
    options: RuntimeOptions,
}

impl GatewayRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the HTTP client built from `config.http`.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn GraphQLTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Forces the background refresh task on, regardless of `health_check.background`.
    #[must_use]
    pub fn enable_health_monitor(mut self) -> Self {
        self.options.enable_health_monitor = Some(true);
        self
    }

    /// Forces the background refresh task off. Health is then probed on demand only.
    #[must_use]
    pub fn disable_health_monitor(mut self) -> Self {
        self.options.enable_health_monitor = Some(false);
        self
    }

    /// Runs both caches memory-only, ignoring `cache.database_url`.
    #[must_use]
    pub fn disable_durable_cache(mut self) -> Self {
        self.options.enable_durable_cache = false;
        self
    }

    /// Validates configuration, opens both caches and wires the pipeline.
    ///
    /// Resolves once both caches are ready (or degraded to memory-only).
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError` if the configuration is invalid or the HTTP client cannot be built.
    pub async fn build(self) -> Result<GatewayRuntime, RuntimeError> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(RuntimeError::ConfigValidation)?;

        let background = self.options.enable_health_monitor.unwrap_or(config.health_check.background);
        info!(
            delayed_url = %config.endpoints.delayed_url,
            live_url = %config.endpoints.live_url,
            routing_mode = ?config.pipeline.routing_mode,
            health_monitor_enabled = background,
            "Initializing gateway runtime"
        );

        let (shutdown_tx, _) = broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY);

        let transport: Arc<dyn GraphQLTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpClient::with_config(config.http.clone())
                    .map_err(|e| RuntimeError::Transport(e.to_string()))?,
            ),
        };

        let endpoints = Arc::new(config.endpoint_set());
        let monitor =
            Arc::new(HealthMonitor::new(endpoints.clone(), transport.clone(), config.health_check.clone()));
        let selector = Arc::new(EndpointSelector::new(
            endpoints,
            FeatureRoutingPolicy::with_overrides(&config.routing.features),
            monitor.clone(),
        ));
        debug!("Endpoint selector initialized");

        let database_url =
            if self.options.enable_durable_cache { config.cache.database_url.as_deref() } else { None };
        let (metadata_cache, query_cache) = tokio::join!(
            TieredCache::open("metadata", &config.cache.metadata, database_url),
            TieredCache::open("queries", &config.cache.queries, database_url),
        );
        let metadata_cache = Arc::new(metadata_cache);
        let query_cache = Arc::new(query_cache);
        debug!(
            metadata_durable = metadata_cache.stats().durable_ready,
            queries_durable = query_cache.stats().durable_ready,
            "Caches initialized"
        );

        let resolver: Arc<dyn EndpointResolver> = match config.pipeline.routing_mode {
            RoutingMode::Static => Arc::new(StaticRouting::new(selector.clone())),
            RoutingMode::Optimal => Arc::new(OptimalRouting::new(selector.clone())),
        };
        let pipeline = build_pipeline(transport, resolver, Some(query_cache.clone()), &config.pipeline);
        let client = Arc::new(QueryClient::new(pipeline, selector));
        debug!("Query pipeline initialized");

        let health_task = background.then(|| monitor.start_with_shutdown(shutdown_tx.subscribe()));

        Ok(GatewayRuntime::new(
            config,
            client,
            monitor,
            metadata_cache,
            query_cache,
            shutdown_tx,
            health_task,
        ))
    }
}
