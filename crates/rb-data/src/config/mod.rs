//! Browser configuration

use serde::{Serialize, Deserialize};

/// Tuning knobs for window fetching and prefetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Row ids requested for the first window of a dataset
    pub initial_limit: usize,

    /// Hard cap for limit doubling, independent of the reported total
    pub max_limit: usize,

    /// Whether payloads are fetched ahead of navigation
    pub prefetch: bool,

    /// Maximum payloads kept in the prefetch cache
    pub cache_capacity: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            initial_limit: 50,
            max_limit: 10_000,
            prefetch: true,
            cache_capacity: 512,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_positive() {
        let config = BrowserConfig::default();

        assert!(config.initial_limit >= 1);
        assert!(config.max_limit >= config.initial_limit);
        assert!(config.cache_capacity >= 1);
    }
}
