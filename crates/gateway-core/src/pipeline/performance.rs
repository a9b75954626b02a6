use super::{QueryContext, QueryHandler};
use crate::{
    endpoint::TransportError,
    types::{GraphQLRequest, GraphQLResponse},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Times the rest of the pipeline and warns on slow queries.
pub struct PerformanceLayer {
    inner: Arc<dyn QueryHandler>,
    threshold: Duration,
}

impl PerformanceLayer {
    #[must_use]
    pub fn new(inner: Arc<dyn QueryHandler>, threshold: Duration) -> Self {
        Self { inner, threshold }
    }
}

#[async_trait]
impl QueryHandler for PerformanceLayer {
    async fn handle(
        &self,
        ctx: &QueryContext,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError> {
        let started = Instant::now();
        let result = self.inner.handle(ctx, request).await;
        let elapsed = started.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        if elapsed > self.threshold {
            warn!(operation = %ctx.operation, duration_ms, "slow query");
        } else {
            debug!(operation = %ctx.operation, duration_ms, "query completed");
        }

        result
    }
}
