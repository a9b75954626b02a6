//! Two-tier key/value cache: a bounded memory tier in front of a durable store.
//!
//! # Consistency
//!
//! The durable store is owned by a single worker task and every durable operation (reads
//! included) goes through its channel in submission order. A `get` issued after a `delete`
//! or `clear` therefore never observes the removed record. `set` returns as soon as the memory
//! tier is updated; call [`TieredCache::flush`] to wait for queued writes.
//!
//! Every `set`, `delete` and `clear` bumps a write generation under the memory lock. A durable
//! read only copies its record into memory (or queues the delete of an expired record) if no
//! write happened while it was in flight; otherwise the memory tier already reflects the newer
//! write and is answered from instead.
//!
//! # Failure handling
//!
//! Durable failures never reach callers. If the store cannot be opened the cache runs
//! memory-only for its whole lifetime; individual operation failures are logged by the worker.

use super::{
    entry::{system_clock, CacheEntry, Clock},
    memory::MemoryTier,
    store::{DurableStore, SqliteStore},
    CacheError, TierConfig,
};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub name: String,
    pub memory_size: usize,
    pub max_memory_items: usize,
    /// Whether the durable tier opened and has not been shut down.
    pub durable_ready: bool,
}

#[derive(Serialize)]
struct RecordRef<'a, T> {
    key: &'a str,
    value: &'a CacheEntry<T>,
}

#[derive(Deserialize)]
struct Record<T> {
    key: String,
    value: CacheEntry<T>,
}

enum StoreOp {
    Get { key: String, reply: oneshot::Sender<Option<String>> },
    Put { key: String, record: String },
    Delete { key: String },
    Clear,
    Flush(oneshot::Sender<()>),
}

struct DurableTier {
    tx: Mutex<Option<mpsc::UnboundedSender<StoreOp>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DurableTier {
    fn spawn(name: Arc<str>, store: Box<dyn DurableStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_store_worker(name, store, rx));
        Self { tx: Mutex::new(Some(tx)), worker: Mutex::new(Some(worker)) }
    }

    /// Returns `false` once the tier has been shut down.
    fn send(&self, op: StoreOp) -> bool {
        self.tx.lock().as_ref().is_some_and(|tx| tx.send(op).is_ok())
    }

    fn is_open(&self) -> bool {
        self.tx.lock().is_some()
    }
}

/// Processes durable operations strictly in submission order.
async fn run_store_worker(
    name: Arc<str>,
    store: Box<dyn DurableStore>,
    mut rx: mpsc::UnboundedReceiver<StoreOp>,
) {
    let mut failures: u64 = 0;
    let mut report = |op: &str, err: &CacheError| {
        failures += 1;
        if failures == 1 {
            warn!(cache = %name, op, error = %err, "durable cache operation failed");
        } else {
            debug!(cache = %name, op, error = %err, failures, "durable cache operation failed");
        }
    };

    while let Some(op) = rx.recv().await {
        match op {
            StoreOp::Get { key, reply } => {
                let record = store.get(&key).await.unwrap_or_else(|e| {
                    report("get", &e);
                    None
                });
                let _ = reply.send(record);
            }
            StoreOp::Put { key, record } => {
                if let Err(e) = store.put(&key, &record).await {
                    report("put", &e);
                }
            }
            StoreOp::Delete { key } => {
                if let Err(e) = store.delete(&key).await {
                    report("delete", &e);
                }
            }
            StoreOp::Clear => {
                if let Err(e) = store.clear().await {
                    report("clear", &e);
                }
            }
            StoreOp::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }

    debug!(cache = %name, "durable cache worker stopped");
}

/// Memory tier plus optional durable tier, holding values of type `T`.
pub struct TieredCache<T> {
    name: Arc<str>,
    default_ttl: Duration,
    memory: Mutex<MemoryTier<T>>,
    /// Bumped under the memory lock by every write.
    generation: AtomicU64,
    durable: Option<DurableTier>,
    clock: Clock,
}

impl<T> TieredCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Opens a cache whose durable tier lives in the `SQLite` database at `database_url`.
    ///
    /// Resolves once the durable tier is ready or has definitively failed. A failure is logged
    /// once and the returned cache runs memory-only.
    pub async fn open(name: &str, config: &TierConfig, database_url: Option<&str>) -> Self {
        match database_url {
            Some(url) => Self::open_with(name, config, SqliteStore::connect(url, &config.table)).await,
            None => Self::memory_only(name, config),
        }
    }

    /// Like [`TieredCache::open`] with a caller-supplied store connector.
    pub async fn open_with<S, F>(name: &str, config: &TierConfig, connect: F) -> Self
    where
        S: DurableStore + 'static,
        F: Future<Output = Result<S, CacheError>>,
    {
        match connect.await {
            Ok(store) => {
                info!(cache = name, table = %config.table, "durable cache tier ready");
                Self::build(name, config, Some(Box::new(store)))
            }
            Err(e) => {
                error!(cache = name, error = %e, "durable cache unavailable, running memory-only");
                Self::build(name, config, None)
            }
        }
    }

    #[must_use]
    pub fn memory_only(name: &str, config: &TierConfig) -> Self {
        Self::build(name, config, None)
    }

    fn build(name: &str, config: &TierConfig, store: Option<Box<dyn DurableStore>>) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            durable: store.map(|store| DurableTier::spawn(name.clone(), store)),
            name,
            default_ttl: config.default_ttl(),
            memory: Mutex::new(MemoryTier::new(config.max_memory_items)),
            generation: AtomicU64::new(0),
            clock: system_clock(),
        }
    }

    /// Replaces the clock used for timestamps and expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value if a valid entry exists in either tier.
    ///
    /// Expired memory entries are removed. A valid durable hit is copied back into the
    /// memory tier; an expired durable record is deleted. If a write lands while the durable
    /// read is in flight, the memory tier answers instead.
    pub async fn get(&self, key: &str) -> Option<T> {
        let generation = {
            let mut memory = self.memory.lock();
            if let Some(value) = self.valid_in_memory(&mut memory, key) {
                return Some(value);
            }
            self.generation.load(Ordering::SeqCst)
        };

        let raw = self.durable_get(key).await?;
        let record: Record<T> = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "discarding unreadable durable record");
                return None;
            }
        };

        if record.key != key {
            warn!(cache = %self.name, key, stored = %record.key, "durable record key mismatch");
            return None;
        }

        let mut memory = self.memory.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(cache = %self.name, key, "cache written during durable read, using memory tier");
            return self.valid_in_memory(&mut memory, key);
        }

        if !record.value.is_valid_at((self.clock)()) {
            self.durable_send(StoreOp::Delete { key: key.to_string() });
            return None;
        }

        let data = record.value.data.clone();
        if let Some(evicted) = memory.insert(key, record.value) {
            debug!(cache = %self.name, evicted = %evicted, "memory tier full, evicted oldest entry");
        }
        Some(data)
    }

    /// Stores `value` under `key` with `ttl` (or the instance default).
    ///
    /// The memory tier is updated before this returns; the durable write is queued.
    pub fn set(&self, key: &str, value: T, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, (self.clock)(), ttl.unwrap_or(self.default_ttl));

        let record = match &self.durable {
            Some(_) => match serde_json::to_string(&RecordRef { key, value: &entry }) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(cache = %self.name, key, error = %e, "failed to serialize cache record");
                    None
                }
            },
            None => None,
        };

        {
            let mut memory = self.memory.lock();
            self.generation.fetch_add(1, Ordering::SeqCst);
            if let Some(evicted) = memory.insert(key, entry) {
                debug!(cache = %self.name, evicted = %evicted, "memory tier full, evicted oldest entry");
            }
        }

        if let Some(record) = record {
            self.durable_send(StoreOp::Put { key: key.to_string(), record });
        }
    }

    /// Removes `key` from both tiers.
    pub fn delete(&self, key: &str) {
        {
            let mut memory = self.memory.lock();
            self.generation.fetch_add(1, Ordering::SeqCst);
            memory.remove(key);
        }
        self.durable_send(StoreOp::Delete { key: key.to_string() });
    }

    /// Removes every entry from both tiers.
    pub fn clear(&self) {
        {
            let mut memory = self.memory.lock();
            self.generation.fetch_add(1, Ordering::SeqCst);
            memory.clear();
        }
        self.durable_send(StoreOp::Clear);
        info!(cache = %self.name, "cache cleared");
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let memory = self.memory.lock();
        CacheStats {
            name: self.name.to_string(),
            memory_size: memory.len(),
            max_memory_items: memory.capacity(),
            durable_ready: self.durable.as_ref().is_some_and(DurableTier::is_open),
        }
    }

    /// Waits until every durable operation queued before this call has been applied.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.durable_send(StoreOp::Flush(ack)) {
            let _ = done.await;
        }
    }

    /// Drains queued durable writes and stops the worker. Further operations are memory-only.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        let Some(durable) = &self.durable else { return };

        drop(durable.tx.lock().take());
        let worker = durable.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(cache = %self.name, error = %e, "durable cache worker panicked");
            }
        }
    }

    /// Returns the memory copy if still valid, purging it otherwise.
    fn valid_in_memory(&self, memory: &mut MemoryTier<T>, key: &str) -> Option<T> {
        let entry = memory.get(key)?;
        if entry.is_valid_at((self.clock)()) {
            return Some(entry.data.clone());
        }
        memory.remove(key);
        debug!(cache = %self.name, key, "memory entry expired");
        None
    }

    fn durable_send(&self, op: StoreOp) -> bool {
        self.durable.as_ref().is_some_and(|d| d.send(op))
    }

    async fn durable_get(&self, key: &str) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        if !self.durable_send(StoreOp::Get { key: key.to_string(), reply }) {
            return None;
        }
        rx.await.ok().flatten()
    }
}
