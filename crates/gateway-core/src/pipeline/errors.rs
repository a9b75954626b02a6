use crate::{endpoint::TransportError, types::EndpointId};
use thiserror::Error;

/// What callers of [`QueryClient::query`](super::QueryClient::query) see on failure.
///
/// Only transport failures become errors; GraphQL `errors` are returned inside the response.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error("query {operation} for feature {feature} failed: {source}")]
    Transport {
        operation: String,
        feature: String,
        /// Request variables as JSON.
        variables: String,
        endpoint: Option<EndpointId>,
        #[source]
        source: TransportError,
    },
}

impl QueryError {
    #[must_use]
    pub fn transport_error(&self) -> &TransportError {
        match self {
            Self::Transport { source, .. } => source,
        }
    }
}
