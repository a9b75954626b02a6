use thiserror::Error;

/// Failures inside the durable cache tier.
///
/// These never escape `TieredCache::get/set/delete/clear`; they are logged and the operation
/// degrades to memory-only behavior.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// The durable store could not be opened or has been shut down.
    #[error("durable cache unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Table names are interpolated into SQL and must be plain identifiers.
    #[error("invalid table name: {0:?}")]
    InvalidTable(String),
}
