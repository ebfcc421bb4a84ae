//! Named cache slots.

use std::fmt;

/// The fixed set of cached feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheSlot {
    Posts,
    Poems,
}

impl CacheSlot {
    /// Every slot the cache is initialized with.
    pub const ALL: [CacheSlot; 2] = [CacheSlot::Posts, CacheSlot::Poems];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSlot::Posts => "posts",
            CacheSlot::Poems => "poems",
        }
    }
}

impl fmt::Display for CacheSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
