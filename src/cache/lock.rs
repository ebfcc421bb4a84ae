use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use super::keys::CacheSlot;

/// Read the slot table, taking over the data if a writer panicked.
pub(crate) fn rw_read<T>(lock: &RwLock<T>, slot: CacheSlot) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        log_poisoned(slot, "read");
        poisoned.into_inner()
    })
}

/// Write the slot table, taking over the data if a writer panicked.
pub(crate) fn rw_write<T>(lock: &RwLock<T>, slot: CacheSlot) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        log_poisoned(slot, "write");
        poisoned.into_inner()
    })
}

fn log_poisoned(slot: CacheSlot, access: &'static str) {
    warn!(
        target = "tumbleproxy::cache",
        slot = slot.as_str(),
        access,
        "feed cache lock poisoned, serving whatever the slot last held"
    );
}
