use std::collections::{BTreeMap, HashMap};

use super::entry::CacheEntry;

/// Bounded in-memory tier with insertion-order eviction.
///
/// Each key gets a monotonically increasing sequence number when first inserted. Overwriting a
/// present key keeps its sequence number, so eviction always removes the earliest-inserted key
/// still present. Reads do not change the order.
pub struct MemoryTier<T> {
    entries: HashMap<String, (u64, CacheEntry<T>)>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
    capacity: usize,
}

impl<T> MemoryTier<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            next_seq: 0,
            capacity,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key).map(|(_, entry)| entry)
    }

    /// Inserts or replaces `key`, returning the key evicted to make room, if any.
    pub fn insert(&mut self, key: &str, entry: CacheEntry<T>) -> Option<String> {
        if let Some(slot) = self.entries.get_mut(key) {
            slot.1 = entry;
            return None;
        }

        if self.capacity == 0 {
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_string());
        self.entries.insert(key.to_string(), (seq, entry));

        evicted
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some((seq, _)) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from earliest to latest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }
}
