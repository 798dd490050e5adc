use std::collections::HashMap;

use crate::types::{AggregateSummary, CacheKey};

/// Manages caching of aggregation summaries per filter combination
pub struct CacheManager {
    cache: HashMap<CacheKey, AggregateSummary>,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Store a summary in the cache
    pub fn store(&mut self, key: CacheKey, summary: AggregateSummary) {
        self.cache.insert(key, summary);
    }

    /// Retrieve a summary from the cache
    pub fn get(&self, key: &CacheKey) -> Option<&AggregateSummary> {
        self.cache.get(key)
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}
