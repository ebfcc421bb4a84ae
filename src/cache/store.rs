//! TTL cache storage for proxied feeds.
//!
//! Each slot holds the last complete result set together with the time it
//! was stored. Entries are only ever overwritten, never evicted.

use std::{collections::HashMap, sync::Arc, sync::RwLock};

use metrics::counter;
use serde_json::Value;
use tracing::debug;

use super::clock::Clock;
use super::config::CacheConfig;
use super::keys::CacheSlot;
use super::lock::{rw_read, rw_write};

pub const CACHE_HIT_METRIC: &str = "tumbleproxy_cache_hit_total";
pub const CACHE_MISS_METRIC: &str = "tumbleproxy_cache_miss_total";

/// Shared, immutable feed payload.
pub type FeedData = Arc<Vec<Value>>;

/// A stored feed and the epoch-millisecond time it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub timestamp_ms: i64,
    pub data: FeedData,
}

impl CacheEntry {
    fn initial() -> Self {
        Self {
            timestamp_ms: 0,
            data: Arc::new(Vec::new()),
        }
    }
}

/// In-memory feed cache with an injected clock and fixed TTL.
pub struct FeedCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<CacheSlot, CacheEntry>>,
}

impl FeedCache {
    /// Create a cache with every known slot set to empty data stamped at 0.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = CacheSlot::ALL
            .into_iter()
            .map(|slot| (slot, CacheEntry::initial()))
            .collect();
        Self {
            config,
            clock,
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, slot: CacheSlot) -> Option<CacheEntry> {
        rw_read(&self.entries, slot).get(&slot).cloned()
    }

    /// Store `data` for `slot`, stamped with the current clock time.
    pub fn set(&self, slot: CacheSlot, data: Vec<Value>) -> FeedData {
        let data = Arc::new(data);
        let entry = CacheEntry {
            timestamp_ms: self.clock.now_ms(),
            data: data.clone(),
        };
        debug!(
            cache = "feed",
            slot = slot.as_str(),
            items = data.len(),
            timestamp_ms = entry.timestamp_ms,
            "storing feed"
        );
        rw_write(&self.entries, slot).insert(slot, entry);
        data
    }

    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now_ms().saturating_sub(entry.timestamp_ms) < self.config.ttl_ms
    }

    /// Return the cached data for `slot` when it exists and is still fresh.
    pub fn fresh(&self, slot: CacheSlot) -> Option<FeedData> {
        let fresh = self
            .get(slot)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.data);

        if fresh.is_some() {
            counter!(CACHE_HIT_METRIC, "slot" => slot.as_str()).increment(1);
            debug!(cache = "feed", slot = slot.as_str(), outcome = "hit", "serving cached feed");
        } else {
            counter!(CACHE_MISS_METRIC, "slot" => slot.as_str()).increment(1);
            debug!(cache = "feed", slot = slot.as_str(), outcome = "miss", "cached feed stale or absent");
        }

        fresh
    }
}
