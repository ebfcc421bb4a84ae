//! Cache configuration.

use std::time::Duration;

const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

/// Feed cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age of a cached feed, in milliseconds.
    pub ttl_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self::with_ttl(settings.ttl)
    }
}

impl CacheConfig {
    /// Build a configuration from a TTL, saturating at `i64::MAX` milliseconds.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_one_hour() {
        assert_eq!(CacheConfig::default().ttl_ms, 3_600_000);
    }

    #[test]
    fn with_ttl_converts_to_millis() {
        let config = CacheConfig::with_ttl(Duration::from_secs(90));
        assert_eq!(config.ttl_ms, 90_000);
    }

    #[test]
    fn with_ttl_saturates() {
        let config = CacheConfig::with_ttl(Duration::MAX);
        assert_eq!(config.ttl_ms, i64::MAX);
    }
}
