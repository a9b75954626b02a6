use thiserror::Error;

/// Failure to obtain a GraphQL response body from an endpoint.
///
/// GraphQL-level `errors` are not transport failures; they travel inside
/// [`GraphQLResponse`](crate::types::GraphQLResponse).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// Request exceeded the configured or enforced timeout.
    #[error("request timeout")]
    Timeout,

    /// Failed to reach the endpoint. The message is sanitized.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-2xx status. First field is the status code, second a truncated body.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// Body was not a GraphQL-over-HTTP response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be serialized.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No permit became available within the permit timeout.
    #[error("concurrency limit reached: {0}")]
    ConcurrencyLimit(String),
}

impl TransportError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError(status, _) => Some(*status),
            _ => None,
        }
    }

    /// True for a 5xx response, the only failure the query pipeline retries.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|status| (500..600).contains(&status))
    }
}
