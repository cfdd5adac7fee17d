use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Last tree listing fetched from upstream
#[derive(Clone, Debug)]
struct CacheEntry {
    tree: Arc<Vec<Value>>,
    fetched_at: Instant,
}

/// Tree listing result together with where it came from
#[derive(Clone, Debug)]
pub struct CachedTree {
    pub tree: Arc<Vec<Value>>,
    pub cached: bool,
}

/// In-memory cache for the repository tree listing with TTL.
///
/// Expired listings are kept so they can still be served when upstream fails.
#[derive(Debug)]
pub struct TreeCache {
    entry: Arc<RwLock<Option<CacheEntry>>>,
    ttl: Duration,
}

impl TreeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Listing younger than the TTL, if any
    pub async fn get_fresh(&self) -> Option<Arc<Vec<Value>>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.tree.clone())
    }

    /// Listing regardless of age
    pub async fn get_stale(&self) -> Option<Arc<Vec<Value>>> {
        let entry = self.entry.read().await;
        entry.as_ref().map(|e| e.tree.clone())
    }

    pub async fn put(&self, tree: Vec<Value>) -> Arc<Vec<Value>> {
        let tree = Arc::new(tree);
        let mut entry = self.entry.write().await;
        *entry = Some(CacheEntry {
            tree: tree.clone(),
            fetched_at: Instant::now(),
        });
        tree
    }

    pub async fn clear(&self) {
        let mut entry = self.entry.write().await;
        *entry = None;
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_cache_basic_operations() {
        let cache = TreeCache::default();
        assert!(cache.get_fresh().await.is_none());
        assert!(cache.get_stale().await.is_none());

        cache
            .put(vec![json!({"path": "m/1.0.0/gen/M-schema.json", "type": "blob"})])
            .await;

        let fresh = cache.get_fresh().await;
        assert!(fresh.is_some());
        assert_eq!(fresh.unwrap().len(), 1);

        cache.clear().await;
        assert!(cache.get_stale().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_listing_is_still_available_as_stale() {
        let cache = TreeCache::new(Duration::ZERO);
        cache.put(vec![json!({"path": "a", "type": "blob"})]).await;

        assert!(cache.get_fresh().await.is_none());
        assert_eq!(cache.get_stale().await.unwrap().len(), 1);
    }
}
