//! Time-bounded cache for Notion API responses.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

/// Maximum number of cached responses.
const MAX_ENTRIES: u64 = 10_000;

/// Cache of decoded JSON responses keyed by request URL.
#[derive(Debug, Clone)]
pub struct NotionCache {
    inner: Cache<String, Arc<Value>>,
}

impl NotionCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: Value) -> Arc<Value> {
        let value = Arc::new(value);
        self.inner.insert(key, value.clone()).await;
        value
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for NotionCache {
    /// One hour TTL.
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }
}
