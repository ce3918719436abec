//! Cache bounds

use serde::{Deserialize, Serialize};

/// Eviction bounds of a cache
///
/// Both bounds are enforced independently; breaking either one triggers
/// eviction. Unset bounds are `usize::MAX`, i.e. unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum total cost of all entries
    pub max_cost: usize,
    /// Maximum number of entries
    pub max_count: usize,
}

impl CacheConfig {
    /// Create a config with both bounds set
    pub fn new(max_cost: usize, max_count: usize) -> Self {
        Self {
            max_cost,
            max_count,
        }
    }

    /// Config with neither bound
    pub fn unbounded() -> Self {
        Self::new(usize::MAX, usize::MAX)
    }

    /// Set the maximum total cost
    pub fn with_max_cost(mut self, max_cost: usize) -> Self {
        self.max_cost = max_cost;
        self
    }

    /// Set the maximum number of entries
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Check if a cache holding `count` entries worth `total_cost` breaks a bound
    ///
    /// The total is wide enough to hold any sum of `usize` costs, so a sum
    /// past `usize::MAX` breaks even the unbounded cost limit.
    pub fn is_over(&self, total_cost: u128, count: usize) -> bool {
        total_cost > self.max_cost as u128 || count > self.max_count
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = CacheConfig::default();
        assert_eq!(config.max_cost, usize::MAX);
        assert_eq!(config.max_count, usize::MAX);
        assert!(!config.is_over(usize::MAX as u128, usize::MAX));
        assert!(config.is_over(usize::MAX as u128 + 1, 0));
    }

    #[test]
    fn test_is_over() {
        let config = CacheConfig::new(10, 5);

        assert!(!config.is_over(10, 5));
        assert!(config.is_over(11, 1));
        assert!(config.is_over(0, 6));
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::unbounded().with_max_count(120);
        assert_eq!(config, CacheConfig::new(usize::MAX, 120));

        let config = config.with_max_cost(64);
        assert_eq!(config, CacheConfig::new(64, 120));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(r#"{"max_count": 120}"#).unwrap();
        assert_eq!(config, CacheConfig::unbounded().with_max_count(120));

        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::unbounded());
    }
}
