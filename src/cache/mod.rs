//! Feed cache.
//!
//! Holds the last successful `/posts` and `/poems` result sets for a fixed
//! time-to-live. Time is read through an injected [`Clock`] so freshness can
//! be driven deterministically.
//!
//! ```toml
//! [cache]
//! ttl_seconds = 3600
//! ```

pub mod clock;
mod config;
mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::CacheSlot;
pub use store::{CACHE_HIT_METRIC, CACHE_MISS_METRIC, CacheEntry, FeedCache, FeedData};
