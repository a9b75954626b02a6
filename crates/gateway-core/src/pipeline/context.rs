use crate::types::EndpointDescriptor;
use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};
use tokio::sync::OnceCell;

/// Per-call options for [`QueryClient::query`](super::QueryClient::query).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Overrides the pipeline's default cache TTL.
    pub ttl: Option<Duration>,
    /// Bypass both cache read and write.
    pub skip_cache: bool,
}

impl QueryOptions {
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }
}

/// State carried through the pipeline for one query.
///
/// The endpoint is resolved at most once per query, so a retry reuses the first
/// attempt's endpoint.
#[derive(Debug)]
pub struct QueryContext {
    pub feature: String,
    /// Operation name, or the document itself for anonymous operations. Part of the cache key.
    pub operation: String,
    pub options: QueryOptions,
    pub(crate) endpoint: OnceCell<EndpointDescriptor>,
    attempts: AtomicU32,
}

impl QueryContext {
    #[must_use]
    pub fn new(feature: impl Into<String>, operation: impl Into<String>, options: QueryOptions) -> Self {
        Self {
            feature: feature.into(),
            operation: operation.into(),
            options,
            endpoint: OnceCell::new(),
            attempts: AtomicU32::new(0),
        }
    }

    /// Endpoint chosen for this query, once the transport has resolved it.
    #[must_use]
    pub fn endpoint(&self) -> Option<&EndpointDescriptor> {
        self.endpoint.get()
    }

    /// Transport attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::AcqRel);
    }
}
