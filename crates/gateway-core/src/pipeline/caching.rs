use super::{QueryContext, QueryHandler};
use crate::{
    cache::{cache_key, TieredCache},
    endpoint::TransportError,
    types::{GraphQLRequest, GraphQLResponse},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Serves queries from the query cache and stores fresh, error-free results.
///
/// With `dedupe_inflight`, concurrent misses on the same key are serialized behind a per-key
/// lock; followers re-read the cache once the leader finishes instead of calling the
/// transport again.
pub struct CacheLayer {
    inner: Arc<dyn QueryHandler>,
    cache: Arc<TieredCache<GraphQLResponse>>,
    default_ttl: Duration,
    inflight: Option<DashMap<String, Arc<Mutex<()>>>>,
}

impl CacheLayer {
    #[must_use]
    pub fn new(
        inner: Arc<dyn QueryHandler>,
        cache: Arc<TieredCache<GraphQLResponse>>,
        default_ttl: Duration,
        dedupe_inflight: bool,
    ) -> Self {
        Self { inner, cache, default_ttl, inflight: dedupe_inflight.then(DashMap::new) }
    }

    #[cfg(test)]
    pub(crate) fn inflight_len(&self) -> usize {
        self.inflight.as_ref().map_or(0, DashMap::len)
    }

    async fn fetch_and_store(
        &self,
        key: &str,
        ctx: &QueryContext,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError> {
        let response = self.inner.handle(ctx, request).await?;

        if response.has_errors() {
            debug!(operation = %ctx.operation, "not caching response with GraphQL errors");
        } else {
            self.cache.set(key, response.clone(), Some(ctx.options.ttl.unwrap_or(self.default_ttl)));
        }

        Ok(response)
    }
}

#[async_trait]
impl QueryHandler for CacheLayer {
    async fn handle(
        &self,
        ctx: &QueryContext,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError> {
        if ctx.options.skip_cache {
            return self.inner.handle(ctx, request).await;
        }

        let key = cache_key(&ctx.operation, &request.variables);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(operation = %ctx.operation, "query cache hit");
            return Ok(hit);
        }
        debug!(operation = %ctx.operation, "query cache miss");

        let Some(inflight) = &self.inflight else {
            return self.fetch_and_store(&key, ctx, request).await;
        };

        let mut guard = InflightGuard::register(inflight, &key);
        guard.acquire().await;

        match self.cache.get(&key).await {
            Some(hit) => {
                debug!(operation = %ctx.operation, "served by concurrent identical query");
                Ok(hit)
            }
            None => self.fetch_and_store(&key, ctx, request).await,
        }
    }
}

/// Per-key registration in the in-flight map.
///
/// Dropping the guard, including when the caller's future is cancelled, releases the key lock
/// and removes the entry once no other query holds or waits on it.
struct InflightGuard<'a> {
    inflight: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    lock: Option<Arc<Mutex<()>>>,
    held: Option<OwnedMutexGuard<()>>,
}

impl<'a> InflightGuard<'a> {
    fn register(inflight: &'a DashMap<String, Arc<Mutex<()>>>, key: &str) -> Self {
        let lock = inflight.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        Self { inflight, key: key.to_string(), lock: Some(lock), held: None }
    }

    async fn acquire(&mut self) {
        if let Some(lock) = &self.lock {
            self.held = Some(Arc::clone(lock).lock_owned().await);
        }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        self.lock.take();
        // Only the map's own reference left means nobody is waiting on this key.
        self.inflight.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
