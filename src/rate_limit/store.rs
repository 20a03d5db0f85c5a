use dashmap::DashMap;
use dashmap::mapref::one::RefMut;

// Above this many keys, lookups first sweep out elapsed windows
pub const COMPACTION_THRESHOLD: usize = 1000;

// Rate limit entry - attempts seen from one key in the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: u64, // epoch ms when the window ends
}

impl RateLimitEntry {
    fn fresh(now: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_time: now.saturating_add(window_ms),
        }
    }

    // Expired entries are replaced, never incremented
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.reset_time
    }

    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }
}

/// Process-wide table of throttling windows, keyed by client identifier.
///
/// Each key lives in a dashmap shard; holding the `RefMut` returned by
/// [`CounterStore::get_or_create`] locks that shard, so evaluate-then-increment
/// on one key is atomic with respect to concurrent requests.
pub struct CounterStore {
    entries: DashMap<String, RateLimitEntry>,
    threshold: usize,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::with_threshold(COMPACTION_THRESHOLD)
    }

    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            threshold,
        }
    }

    /// Returns the live entry for `key` and whether it was just installed.
    /// A missing or expired entry is replaced by a fresh one with `count = 1`.
    pub fn get_or_create(
        &self,
        key: &str,
        now: u64,
        window_ms: u64,
    ) -> (RefMut<'_, String, RateLimitEntry>, bool) {
        let mut created = false;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| {
                created = true;
                RateLimitEntry::fresh(now, window_ms)
            });

        if !created && entry.is_expired(now) {
            *entry = RateLimitEntry::fresh(now, window_ms);
            created = true;
        }

        (entry, created)
    }

    /// Drops every entry whose window ended before `now`, but only once the
    /// table has grown past the threshold. Returns how many were removed.
    pub fn compact(&self, now: u64) -> usize {
        if self.entries.len() <= self.threshold {
            return 0;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_time >= now);
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "compacted rate limit store");
        }
        removed
    }

    /// Gives back one attempt, as long as the window that recorded it is
    /// still the current one.
    pub fn refund(&self, key: &str, reset_time: u64) -> Option<RateLimitEntry> {
        let mut entry = self.entries.get_mut(key)?;
        if entry.reset_time == reset_time && entry.count > 0 {
            entry.count -= 1;
        }
        Some(*entry)
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_lookup_installs_fresh_entry() {
        let store = CounterStore::new();
        let (entry, created) = store.get_or_create("ip:1.1.1.1", 1_000, 60_000);
        assert!(created);
        assert_eq!(entry.count, 1);
        assert_eq!(entry.reset_time, 61_000);
    }

    #[test]
    fn live_entry_is_returned_untouched() {
        let store = CounterStore::new();
        {
            let (mut entry, _) = store.get_or_create("k", 1_000, 60_000);
            entry.increment();
        }
        let (entry, created) = store.get_or_create("k", 30_000, 60_000);
        assert!(!created);
        assert_eq!(entry.count, 2);
        assert_eq!(entry.reset_time, 61_000);
    }

    #[test]
    fn expired_entry_is_replaced_not_incremented() {
        let store = CounterStore::new();
        {
            let (mut entry, _) = store.get_or_create("k", 0, 1_000);
            entry.increment();
            entry.increment();
        }
        // reset_time == now counts as expired
        let (entry, created) = store.get_or_create("k", 1_000, 1_000);
        assert!(created);
        assert_eq!(entry.count, 1);
        assert_eq!(entry.reset_time, 2_000);
    }

    #[test]
    fn compaction_waits_for_threshold() {
        let store = CounterStore::with_threshold(3);
        for i in 0..3 {
            drop(store.get_or_create(&format!("k{i}"), 0, 10));
        }
        assert_eq!(store.compact(1_000), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn compaction_removes_only_elapsed_windows() {
        let store = CounterStore::with_threshold(3);
        for i in 0..3 {
            drop(store.get_or_create(&format!("old{i}"), 0, 10));
        }
        drop(store.get_or_create("live", 0, 10_000));

        assert_eq!(store.compact(500), 3);
        assert_eq!(store.len(), 1);
        assert!(store.get("live").is_some());
    }

    #[test]
    fn refund_only_applies_to_same_window() {
        let store = CounterStore::new();
        {
            let (mut entry, _) = store.get_or_create("k", 0, 1_000);
            entry.increment();
        }
        assert_eq!(store.refund("k", 1_000).map(|e| e.count), Some(1));
        assert_eq!(store.refund("k", 9_999).map(|e| e.count), Some(1));
        assert!(store.refund("missing", 1_000).is_none());
    }
}
