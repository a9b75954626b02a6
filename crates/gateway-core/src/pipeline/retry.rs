use super::{QueryContext, QueryHandler};
use crate::{
    endpoint::TransportError,
    types::{GraphQLRequest, GraphQLResponse},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

/// Outermost stage: retries a 5xx failure exactly once, then logs what surfaces.
pub struct RetryLayer {
    inner: Arc<dyn QueryHandler>,
}

impl RetryLayer {
    #[must_use]
    pub fn new(inner: Arc<dyn QueryHandler>) -> Self {
        Self { inner }
    }

    fn log_failure(ctx: &QueryContext, request: &GraphQLRequest, err: &TransportError) {
        error!(
            operation = %ctx.operation,
            feature = %ctx.feature,
            variables = %request.variables,
            endpoint = ?ctx.endpoint().map(|e| e.id),
            attempts = ctx.attempts(),
            error = %err,
            "query failed"
        );
    }
}

#[async_trait]
impl QueryHandler for RetryLayer {
    async fn handle(
        &self,
        ctx: &QueryContext,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError> {
        let result = match self.inner.handle(ctx, request).await {
            Err(e) if e.is_server_error() => {
                warn!(operation = %ctx.operation, error = %e, "server error, retrying once");
                self.inner.handle(ctx, request).await
            }
            other => other,
        };

        match &result {
            Ok(response) if response.has_errors() => {
                warn!(
                    operation = %ctx.operation,
                    feature = %ctx.feature,
                    errors = %response.error_summary(),
                    "query returned GraphQL errors"
                );
            }
            Ok(_) => {}
            Err(e) => Self::log_failure(ctx, request, e),
        }

        result
    }
}
