use super::{QueryContext, QueryError, QueryHandler, QueryOptions};
use crate::{
    endpoint::EndpointSelector,
    types::{GraphQLRequest, GraphQLResponse, PerformanceStatus},
};
use std::sync::Arc;

/// Facade used by the rest of the application to run queries and inspect endpoint health.
pub struct QueryClient {
    pipeline: Arc<dyn QueryHandler>,
    selector: Arc<EndpointSelector>,
}

impl QueryClient {
    #[must_use]
    pub fn new(pipeline: Arc<dyn QueryHandler>, selector: Arc<EndpointSelector>) -> Self {
        Self { pipeline, selector }
    }

    /// Runs `request` for `feature` through the pipeline.
    ///
    /// The operation name (or, for anonymous operations, the document) plus the variables form
    /// the cache key. GraphQL `errors` come back inside `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Transport`] when no response body could be obtained.
    pub async fn query(
        &self,
        feature: &str,
        request: GraphQLRequest,
        options: QueryOptions,
    ) -> Result<GraphQLResponse, QueryError> {
        let operation = request.operation_name.clone().unwrap_or_else(|| request.query.clone());
        let ctx = QueryContext::new(feature, operation, options);

        self.pipeline.handle(&ctx, &request).await.map_err(|source| QueryError::Transport {
            operation: ctx.operation.clone(),
            feature: ctx.feature.clone(),
            variables: request.variables.to_string(),
            endpoint: ctx.endpoint().map(|e| e.id),
            source,
        })
    }

    /// URL of the currently optimal endpoint, probing first if health is stale.
    pub async fn optimal_endpoint_url(&self) -> String {
        self.selector.optimal().await.url
    }

    /// Last published health of both endpoints.
    #[must_use]
    pub fn performance_status(&self) -> PerformanceStatus {
        self.selector.monitor().performance_status()
    }

    #[must_use]
    pub fn selector(&self) -> &Arc<EndpointSelector> {
        &self.selector
    }
}
