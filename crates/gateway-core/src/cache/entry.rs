use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

/// Source of "now" in epoch milliseconds. Injected so expiry can be tested without sleeping.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall-clock epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(now_ms)
}

/// A cached value together with when it was stored and how long it stays valid.
///
/// Entries are immutable; a new `set` under the same key replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    /// Epoch milliseconds at insertion.
    pub stored_at: i64,
    /// Time-to-live in milliseconds.
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    #[must_use]
    pub fn new(data: T, stored_at: i64, ttl: Duration) -> Self {
        let ttl = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Self { data, stored_at, ttl }
    }

    /// Valid iff `now - stored_at < ttl`. Recomputed on every call.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        let age = i128::from(now) - i128::from(self.stored_at);
        age < i128::from(self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_valid_strictly_before_ttl() {
        let entry = CacheEntry::new("v", 1_000, Duration::from_millis(500));

        assert!(entry.is_valid_at(1_000));
        assert!(entry.is_valid_at(1_499));
        assert!(!entry.is_valid_at(1_500));
        assert!(!entry.is_valid_at(9_000));
    }

    #[test]
    fn test_zero_ttl_is_never_valid() {
        let entry = CacheEntry::new(1u8, 1_000, Duration::ZERO);
        assert!(!entry.is_valid_at(1_000));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = CacheEntry::new(serde_json::json!({"a": 1}), 42, Duration::from_secs(1));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["storedAt"], 42);
        assert_eq!(value["ttl"], 1000);
        assert_eq!(value["data"]["a"], 1);
    }
}
