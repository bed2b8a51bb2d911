use std::sync::Arc;

use crate::{db::Cache, store::TagStore};

const DEFAULT_RESOLVE_CACHE_TTL_SECS: u64 = 3600;

/// Shared, read-only handles passed to every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TagStore>,
    pub cache: Option<Cache>,
    pub resolve_cache_ttl_secs: u64,
}

impl AppState {
    /// State without a cache in front of the store
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self {
            store,
            cache: None,
            resolve_cache_ttl_secs: DEFAULT_RESOLVE_CACHE_TTL_SECS,
        }
    }

    pub fn with_cache(mut self, cache: Cache, ttl_secs: u64) -> Self {
        self.cache = Some(cache);
        self.resolve_cache_ttl_secs = ttl_secs;
        self
    }
}
