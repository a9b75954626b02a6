use super::{GraphQLTransport, TransportError};
use crate::types::{GraphQLRequest, GraphQLResponse};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// HTTP client concurrency and timeout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent HTTP requests allowed
    pub concurrent_limit: usize,
    /// Permit acquisition timeout in milliseconds
    pub permit_timeout_ms: u64,
    /// Connect timeout in seconds
    pub connect_timeout_seconds: u64,
    /// Request timeout in seconds when the caller does not supply one
    pub request_timeout_seconds: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 64,
            permit_timeout_ms: 5_000,
            connect_timeout_seconds: 5,
            request_timeout_seconds: 45,
        }
    }
}

/// GraphQL-over-HTTP client with semaphore-based concurrency control.
///
/// Performs a single attempt per call. Retrying is the query pipeline's job.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

/// Keeps the permit alive for the duration of one request.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .use_rustls_tls()
            .user_agent(concat!("subgraph-gateway/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                TransportError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client, concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)), config })
    }

    /// Sanitizes network errors so URLs and credentials embedded in them are not logged.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else {
            "network error".to_string()
        }
    }

    fn map_reqwest_error(error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::ConnectionFailed(Self::sanitize_network_error(error))
        }
    }

    async fn acquire(&self, url: &str) -> Result<PermitGuard, TransportError> {
        let permit = tokio::time::timeout(
            Duration::from_millis(self.config.permit_timeout_ms),
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                url = url,
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            TransportError::ConcurrencyLimit(url.to_string())
        })?
        .map_err(|_| TransportError::ConcurrencyLimit(url.to_string()))?;

        Ok(PermitGuard { _permit: permit, semaphore: self.concurrent_limit.clone() })
    }

    /// POSTs `body` as JSON and returns the raw response bytes of a 2xx response.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] if the request times out
    /// - [`TransportError::ConcurrencyLimit`] if no permit is available in time
    /// - [`TransportError::HttpError`] for non-success status codes
    /// - [`TransportError::ConnectionFailed`] for other network failures
    pub async fn send_request(
        &self,
        url: &str,
        body: bytes::Bytes,
        timeout: Option<Duration>,
    ) -> Result<bytes::Bytes, TransportError> {
        let _permit = self.acquire(url).await?;

        let mut builder =
            self.client.post(url).header("content-type", "application/json").body(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| Self::map_reqwest_error(&e))?;
        let status = response.status();

        if status.is_success() {
            return response.bytes().await.map_err(|e| Self::map_reqwest_error(&e));
        }

        let raw_text = response.text().await.unwrap_or_default();
        let sanitized_text = if raw_text.len() > 256 {
            let cut = (0..=256).rev().find(|i| raw_text.is_char_boundary(*i)).unwrap_or(0);
            format!("{}... (truncated)", &raw_text[..cut])
        } else {
            raw_text
        };
        tracing::trace!(status = status.as_u16(), url = url, "http request failed");
        Err(TransportError::HttpError(status.as_u16(), sanitized_text))
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}

#[async_trait]
impl GraphQLTransport for HttpClient {
    async fn post(
        &self,
        url: &str,
        request: &GraphQLRequest,
        timeout: Option<Duration>,
    ) -> Result<GraphQLResponse, TransportError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let bytes = self.send_request(url, bytes::Bytes::from(body), timeout).await?;

        serde_json::from_slice::<GraphQLResponse>(&bytes)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}
