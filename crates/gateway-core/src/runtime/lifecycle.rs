//! Runtime lifecycle: component access and graceful shutdown.

use crate::{
    cache::TieredCache, config::AppConfig, endpoint::HealthMonitor, pipeline::QueryClient,
    types::GraphQLResponse,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use super::builder::GatewayRuntimeBuilder;

/// Owns every initialized component and the background health task.
pub struct GatewayRuntime {
    config: AppConfig,
    client: Arc<QueryClient>,
    monitor: Arc<HealthMonitor>,
    metadata_cache: Arc<TieredCache<Value>>,
    query_cache: Arc<TieredCache<GraphQLResponse>>,
    shutdown_tx: broadcast::Sender<()>,
    health_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_initiated: AtomicBool,
}

impl GatewayRuntime {
    #[must_use]
    pub fn builder() -> GatewayRuntimeBuilder {
        GatewayRuntimeBuilder::new()
    }

    pub(super) fn new(
        config: AppConfig,
        client: Arc<QueryClient>,
        monitor: Arc<HealthMonitor>,
        metadata_cache: Arc<TieredCache<Value>>,
        query_cache: Arc<TieredCache<GraphQLResponse>>,
        shutdown_tx: broadcast::Sender<()>,
        health_task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            config,
            client,
            monitor,
            metadata_cache,
            query_cache,
            shutdown_tx,
            health_task: Mutex::new(health_task),
            shutdown_initiated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn query_client(&self) -> &Arc<QueryClient> {
        &self.client
    }

    #[must_use]
    pub fn health_monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    /// Long-lived cache for token metadata.
    #[must_use]
    pub fn metadata_cache(&self) -> &Arc<TieredCache<Value>> {
        &self.metadata_cache
    }

    /// Short-lived cache backing the query pipeline.
    #[must_use]
    pub fn query_cache(&self) -> &Arc<TieredCache<GraphQLResponse>> {
        &self.query_cache
    }

    #[must_use]
    pub fn has_health_task(&self) -> bool {
        self.health_task.lock().is_some()
    }

    /// Creates a new shutdown receiver for external shutdown coordination.
    #[must_use]
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Stops the health task and drains both caches' durable writes.
    ///
    /// Idempotent: later calls log and return.
    pub async fn shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Shutdown already initiated, ignoring duplicate call");
            return;
        }

        info!("Initiating gateway runtime shutdown");
        if self.shutdown_tx.send(()).is_err() {
            debug!("No shutdown receivers registered");
        }

        let health_task = self.health_task.lock().take();
        if let Some(task) = health_task {
            match task.await {
                Ok(()) => debug!("Health monitor task completed"),
                Err(e) if e.is_cancelled() => debug!("Health monitor task cancelled"),
                Err(e) => error!(error = %e, "Health monitor task failed"),
            }
        }

        tokio::join!(self.metadata_cache.shutdown(), self.query_cache.shutdown());
        info!("Gateway runtime shutdown complete");
    }
}
