use std::collections::BTreeMap;
use std::path::PathBuf;

use hopsh_core::Node;
use hopsh_core::NodeCache;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// On-disk node cache: one JSON object mapping region keys to node arrays.
///
/// A missing, unreadable or unparsable file is a cache miss, never an error;
/// a failed write is logged and browsing continues with in-memory data only.
pub struct FileNodeCache {
    path: PathBuf,
}

impl FileNodeCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> Option<BTreeMap<String, Vec<Node>>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "node cache not readable");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => Some(map),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "node cache corrupt; treating as miss");
                None
            }
        }
    }
}

impl NodeCache for FileNodeCache {
    fn load(&self, region_key: &str) -> Option<Vec<Node>> {
        self.read_all()?.remove(region_key)
    }

    fn save(&self, region_key: &str, nodes: &[Node]) {
        // Read-modify-write so other regions' entries survive.
        let mut map = self.read_all().unwrap_or_default();
        map.insert(region_key.to_string(), nodes.to_vec());

        let json = match serde_json::to_vec(&map) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize node cache");
                return;
            }
        };
        if let Some(parent) = self.path.parent()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            warn!(path = %self.path.display(), error = %err, "failed to create cache directory");
            return;
        }
        match std::fs::write(&self.path, json) {
            Ok(()) => info!(path = %self.path.display(), nodes = nodes.len(), "node cache written"),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to write node cache");
            }
        }
    }
}
