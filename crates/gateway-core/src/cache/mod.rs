//! Tiered caching for query results and token metadata.
//!
//! Each [`TieredCache`] instance pairs a bounded in-memory tier with an optional durable
//! `SQLite` table:
//!
//! ```text
//!   get ──► MemoryTier (FIFO, capacity N) ──miss/expired──► store worker ──► SQLite table
//!   set ──► MemoryTier (sync)            ──queued────────► store worker ──► SQLite table
//! ```
//!
//! Two instances are created by the runtime: `metadata` (500 items, 7 days) and
//! `queries` (100 items, 5 minutes). They share one database file and use separate tables.

pub mod config;
pub mod entry;
pub mod errors;
pub mod key;
pub mod memory;
pub mod store;
pub mod tiered;

pub use config::{CacheConfig, TierConfig};
pub use entry::{now_ms, system_clock, CacheEntry, Clock};
pub use errors::CacheError;
pub use key::cache_key;
pub use memory::MemoryTier;
pub use store::{DurableStore, SqliteStore};
pub use tiered::{CacheStats, TieredCache};
