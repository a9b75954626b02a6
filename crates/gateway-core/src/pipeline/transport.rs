use super::{QueryContext, QueryHandler};
use crate::{
    endpoint::{EndpointResolver, GraphQLTransport, TransportError},
    types::{GraphQLRequest, GraphQLResponse},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Innermost stage: resolves the endpoint for the query and POSTs the request to it.
pub struct TransportHandler {
    transport: Arc<dyn GraphQLTransport>,
    resolver: Arc<dyn EndpointResolver>,
}

impl TransportHandler {
    #[must_use]
    pub fn new(transport: Arc<dyn GraphQLTransport>, resolver: Arc<dyn EndpointResolver>) -> Self {
        Self { transport, resolver }
    }
}

#[async_trait]
impl QueryHandler for TransportHandler {
    async fn handle(
        &self,
        ctx: &QueryContext,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError> {
        let endpoint = ctx.endpoint.get_or_init(|| self.resolver.resolve(&ctx.feature)).await;

        ctx.record_attempt();
        debug!(
            operation = %ctx.operation,
            endpoint = %endpoint.id,
            attempt = ctx.attempts(),
            "sending query"
        );

        self.transport.post(&endpoint.url, request, None).await
    }
}
