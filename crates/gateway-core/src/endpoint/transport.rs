use super::TransportError;
use crate::types::{GraphQLRequest, GraphQLResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Sends one GraphQL request to one URL.
///
/// Implemented by [`HttpClient`](super::HttpClient) in production; tests substitute scripted
/// transports. A `timeout` of `None` uses the implementation's default.
#[async_trait]
pub trait GraphQLTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        request: &GraphQLRequest,
        timeout: Option<Duration>,
    ) -> Result<GraphQLResponse, TransportError>;
}
