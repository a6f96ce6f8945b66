use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;

use crate::error::InventoryError;
use crate::node::Node;

/// The inventory acquisition collaborator: a real bastion CLI wrapper or a
/// canned demo set. The engine never branches on which one it holds.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Human-readable cluster/profile name for the status line.
    fn cluster(&self) -> &str;

    /// Cache-partitioning identifier under which fetched sets are persisted.
    fn region_key(&self) -> &str;

    async fn fetch(&self, refresh: bool) -> Result<Vec<Node>, InventoryError>;
}

/// Persistent cache collaborator. Both operations are infallible from the
/// engine's point of view: a missing or unreadable cache is a miss and a
/// failed write is logged by the implementation, never surfaced.
pub trait NodeCache: Send + Sync {
    fn load(&self, region_key: &str) -> Option<Vec<Node>>;
    fn save(&self, region_key: &str, nodes: &[Node]);
}

/// Cache implementation used when no cache file is configured.
pub struct NoopCache;

impl NodeCache for NoopCache {
    fn load(&self, _region_key: &str) -> Option<Vec<Node>> {
        None
    }

    fn save(&self, _region_key: &str, _nodes: &[Node]) {}
}

/// Holds the full node set for one browsing session and refreshes it on
/// demand from the source, going through the cache collaborator.
pub struct InventoryStore {
    source: Arc<dyn InventorySource>,
    cache: Arc<dyn NodeCache>,
    nodes: Vec<Node>,
}

impl InventoryStore {
    pub fn new(source: Arc<dyn InventorySource>, cache: Arc<dyn NodeCache>) -> Self {
        Self {
            source,
            cache,
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Replace the held set wholesale. With `force_refresh` unset a cached
    /// set satisfies the load; otherwise the source is re-acquired and the
    /// fresh set is persisted under the source's region key. On failure the
    /// prior contents are left untouched.
    pub async fn load(&mut self, force_refresh: bool) -> Result<Vec<Node>, InventoryError> {
        if !force_refresh
            && let Some(cached) = self.cache.load(self.source.region_key())
            && !cached.is_empty()
        {
            debug!(nodes = cached.len(), "serving inventory from cache");
            self.nodes = cached.clone();
            return Ok(cached);
        }

        let nodes = self.source.fetch(force_refresh).await?;
        info!(nodes = nodes.len(), cluster = self.source.cluster(), "inventory fetched");
        self.cache.save(self.source.region_key(), &nodes);
        self.nodes = nodes.clone();
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct StaticSource {
        nodes: Result<Vec<Node>, InventoryError>,
    }

    #[async_trait]
    impl InventorySource for StaticSource {
        fn cluster(&self) -> &str {
            "test-cluster"
        }

        fn region_key(&self) -> &str {
            "test-region"
        }

        async fn fetch(&self, _refresh: bool) -> Result<Vec<Node>, InventoryError> {
            self.nodes.clone()
        }
    }

    #[derive(Default)]
    struct RecordingCache {
        cached: Option<Vec<Node>>,
        saved: Mutex<Vec<(String, Vec<Node>)>>,
    }

    impl NodeCache for RecordingCache {
        fn load(&self, _region_key: &str) -> Option<Vec<Node>> {
            self.cached.clone()
        }

        fn save(&self, region_key: &str, nodes: &[Node]) {
            self.saved
                .lock()
                .expect("cache lock")
                .push((region_key.to_string(), nodes.to_vec()));
        }
    }

    fn host(hostname: &str) -> Node {
        Node {
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn load_without_refresh_prefers_the_cache() {
        let source = Arc::new(StaticSource {
            nodes: Ok(vec![host("fresh")]),
        });
        let cache = Arc::new(RecordingCache {
            cached: Some(vec![host("cached")]),
            ..Default::default()
        });
        let mut store = InventoryStore::new(source, cache.clone());

        let nodes = store.load(false).await.expect("load");
        assert_eq!(nodes, vec![host("cached")]);
        assert!(cache.saved.lock().expect("cache lock").is_empty());
    }

    #[tokio::test]
    async fn forced_refresh_fetches_and_persists() {
        let source = Arc::new(StaticSource {
            nodes: Ok(vec![host("fresh")]),
        });
        let cache = Arc::new(RecordingCache {
            cached: Some(vec![host("cached")]),
            ..Default::default()
        });
        let mut store = InventoryStore::new(source, cache.clone());

        let nodes = store.load(true).await.expect("load");
        assert_eq!(nodes, vec![host("fresh")]);
        assert_eq!(
            cache.saved.lock().expect("cache lock").as_slice(),
            &[("test-region".to_string(), vec![host("fresh")])]
        );
    }

    #[tokio::test]
    async fn failed_fetch_leaves_prior_contents_untouched() {
        let good = Arc::new(StaticSource {
            nodes: Ok(vec![host("fresh")]),
        });
        let cache = Arc::new(RecordingCache::default());
        let mut store = InventoryStore::new(good, cache.clone());
        store.load(false).await.expect("initial load");

        store.source = Arc::new(StaticSource {
            nodes: Err(InventoryError::SourceUnavailable("gone".to_string())),
        });
        let err = store.load(true).await.expect_err("fetch should fail");
        assert_eq!(err, InventoryError::SourceUnavailable("gone".to_string()));
        assert_eq!(store.nodes(), &[host("fresh")]);
    }

    #[tokio::test]
    async fn empty_cache_entry_falls_through_to_the_source() {
        let source = Arc::new(StaticSource {
            nodes: Ok(vec![host("fresh")]),
        });
        let cache = Arc::new(RecordingCache {
            cached: Some(Vec::new()),
            ..Default::default()
        });
        let mut store = InventoryStore::new(source, cache);

        let nodes = store.load(false).await.expect("load");
        assert_eq!(nodes, vec![host("fresh")]);
    }
}
