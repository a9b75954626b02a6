use super::{health::HealthMonitor, routing::FeatureRoutingPolicy};
use crate::types::{EndpointDescriptor, EndpointId, EndpointSet, PerformanceStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Picks the endpoint among `status` that should serve the next query.
///
/// One healthy endpoint wins outright. With both healthy the lower effective latency wins,
/// ties going to Delayed. With neither healthy the result is Delayed.
#[must_use]
pub fn choose_optimal(status: &PerformanceStatus) -> EndpointId {
    match (status.delayed.is_healthy, status.live.is_healthy) {
        (true, false) => EndpointId::Delayed,
        (false, true) => EndpointId::Live,
        (true, true) => {
            if status.live.response_time_ms < status.delayed.response_time_ms {
                EndpointId::Live
            } else {
                EndpointId::Delayed
            }
        }
        (false, false) => {
            warn!("no healthy endpoint, falling back to delayed");
            EndpointId::Delayed
        }
    }
}

/// Resolves endpoints by feature (static) or by measured health (optimal).
pub struct EndpointSelector {
    endpoints: Arc<EndpointSet>,
    policy: FeatureRoutingPolicy,
    monitor: Arc<HealthMonitor>,
}

impl EndpointSelector {
    #[must_use]
    pub fn new(
        endpoints: Arc<EndpointSet>,
        policy: FeatureRoutingPolicy,
        monitor: Arc<HealthMonitor>,
    ) -> Self {
        Self { endpoints, policy, monitor }
    }

    /// Static lookup. Ignores health entirely.
    #[must_use]
    pub fn for_feature(&self, feature: &str) -> &EndpointDescriptor {
        self.endpoints.get(self.policy.route(feature))
    }

    /// Refreshes health if stale, then ranks the endpoints.
    pub async fn optimal(&self) -> EndpointDescriptor {
        let status = self.monitor.refresh_if_stale().await;
        let id = choose_optimal(&status);
        debug!(
            endpoint = %id,
            delayed_ms = status.delayed.response_time_ms,
            live_ms = status.live.response_time_ms,
            "selected optimal endpoint"
        );
        self.endpoints.get(id).clone()
    }

    /// The sibling of `id`.
    #[must_use]
    pub fn fallback_for(&self, id: EndpointId) -> &EndpointDescriptor {
        self.endpoints.get(id.sibling())
    }

    #[must_use]
    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    #[must_use]
    pub fn policy(&self) -> &FeatureRoutingPolicy {
        &self.policy
    }

    #[must_use]
    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }
}

/// Chooses the endpoint for one request. Called once per request, before the first attempt.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(&self, feature: &str) -> EndpointDescriptor;
}

/// Routes by the feature map.
pub struct StaticRouting {
    selector: Arc<EndpointSelector>,
}

impl StaticRouting {
    #[must_use]
    pub fn new(selector: Arc<EndpointSelector>) -> Self {
        Self { selector }
    }
}

#[async_trait]
impl EndpointResolver for StaticRouting {
    async fn resolve(&self, feature: &str) -> EndpointDescriptor {
        let endpoint = self.selector.for_feature(feature);
        debug!(feature, endpoint = %endpoint.id, "resolved endpoint by feature");
        endpoint.clone()
    }
}

/// Routes every request to the currently optimal endpoint.
pub struct OptimalRouting {
    selector: Arc<EndpointSelector>,
}

impl OptimalRouting {
    #[must_use]
    pub fn new(selector: Arc<EndpointSelector>) -> Self {
        Self { selector }
    }
}

#[async_trait]
impl EndpointResolver for OptimalRouting {
    async fn resolve(&self, _feature: &str) -> EndpointDescriptor {
        self.selector.optimal().await
    }
}
