//! Query execution pipeline.
//!
//! Every query passes through the same fixed chain, assembled once per client:
//!
//! ```text
//! QueryClient::query
//!       │
//!       ▼
//! ┌──────────────┐
//! │ RetryLayer   │  5xx ──► one immediate retry, same endpoint
//! └──────┬───────┘
//!        ▼
//! ┌──────────────────┐
//! │ PerformanceLayer │  > threshold ──► warn
//! └──────┬───────────┘
//!        ▼
//! ┌──────────────┐
//! │ CacheLayer   │  hit ──► return; miss ──► fetch, store if error-free
//! └──────┬───────┘
//!        ▼
//! ┌──────────────────┐
//! │ TransportHandler │  EndpointResolver ──► HTTP POST
//! └──────────────────┘
//! ```

pub mod caching;
pub mod client;
pub mod context;
pub mod errors;
pub mod performance;
pub mod retry;
pub mod transport;

pub use caching::CacheLayer;
pub use client::QueryClient;
pub use context::{QueryContext, QueryOptions};
pub use errors::QueryError;
pub use performance::PerformanceLayer;
pub use retry::RetryLayer;
pub use transport::TransportHandler;

use crate::{
    cache::TieredCache,
    config::PipelineConfig,
    endpoint::{EndpointResolver, GraphQLTransport, TransportError},
    types::{GraphQLRequest, GraphQLResponse},
};
use async_trait::async_trait;
use std::sync::Arc;

/// One stage of the pipeline.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &QueryContext,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError>;
}

/// Composes the fixed chain. Without a cache the cache stage is omitted.
#[must_use]
pub fn build_pipeline(
    transport: Arc<dyn GraphQLTransport>,
    resolver: Arc<dyn EndpointResolver>,
    cache: Option<Arc<TieredCache<GraphQLResponse>>>,
    config: &PipelineConfig,
) -> Arc<dyn QueryHandler> {
    let mut handler: Arc<dyn QueryHandler> = Arc::new(TransportHandler::new(transport, resolver));

    if let Some(cache) = cache {
        handler = Arc::new(CacheLayer::new(
            handler,
            cache,
            config.default_ttl(),
            config.dedupe_inflight,
        ));
    }

    handler = Arc::new(PerformanceLayer::new(handler, config.slow_query_threshold()));
    Arc::new(RetryLayer::new(handler))
}
