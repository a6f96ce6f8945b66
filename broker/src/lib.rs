//! External collaborators of the browsing engine: the Teleport `tsh`
//! inventory source (and its demo stand-in), the on-disk node cache, the
//! remote-shell launcher, and the config file loader.

mod cache;
mod config;
mod connect;
mod demo;
mod error;
mod tsh;

use std::sync::Arc;

use hopsh_core::InventorySource;
use hopsh_core::NodeCache;
use hopsh_core::NoopCache;
use tracing::info;

pub use cache::FileNodeCache;
pub use config::Config;
pub use connect::Connector;
pub use demo::DemoSource;
pub use error::BrokerError;
pub use tsh::TshSource;
pub use tsh::parse_nodes;
pub use tsh::strip_invalid_json_prefix;

/// Environment variable selecting demo mode; its value is the ssh target
/// used on connect.
pub const DEMO_ENV_VAR: &str = "HOPSH_DEMO";

/// The wired-up set of collaborators for one browsing session.
pub struct Broker {
    pub source: Arc<dyn InventorySource>,
    pub cache: Arc<dyn NodeCache>,
    pub connector: Connector,
    /// Cache file location, when caching is enabled.
    pub cache_path: Option<std::path::PathBuf>,
}

/// Construct the source/cache/connector trio from config and environment.
/// The demo/real choice is made once, here; the engine only ever sees the
/// `InventorySource` trait.
pub fn connect_broker(config: &Config) -> Result<Broker, BrokerError> {
    let cache_path = config.node_cache_file.clone();
    let cache: Arc<dyn NodeCache> = match &cache_path {
        Some(path) => Arc::new(FileNodeCache::new(path.clone())),
        None => Arc::new(NoopCache),
    };

    if let Ok(target) = std::env::var(DEMO_ENV_VAR) {
        info!(ssh_target = target.as_str(), "demo mode enabled");
        let ssh = which::which("ssh").map_err(|_| BrokerError::SshNotFound)?;
        return Ok(Broker {
            source: Arc::new(DemoSource),
            cache,
            connector: Connector::Ssh { ssh, target },
            cache_path,
        });
    }

    let source = TshSource::new(config)?;
    let tsh = source.tsh_path().to_path_buf();
    Ok(Broker {
        source: Arc::new(source),
        cache,
        connector: Connector::Tsh { tsh },
        cache_path,
    })
}
