//! Interactive terminal frontend for the host browser: wires the browsing
//! engine to the `tsh`/demo collaborators, runs the crossterm event loop,
//! and launches the remote shell on selection.

mod app;
mod app_event;
mod cli;
mod terminal;
mod view;

use color_eyre::eyre::Result;
use color_eyre::eyre::eyre;
use hopsh_broker::Broker;
use hopsh_broker::Config;
use hopsh_broker::connect_broker;
use hopsh_core::InventoryStore;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::AppOutcome;

pub use cli::Cli;

pub async fn run_main(cli: Cli) -> Result<i32> {
    let _log_guard = init_logging()?;
    let config = Config::load(cli.config.as_deref())?;
    let broker = connect_broker(&config)?;

    if cli.nodecache {
        return populate_node_cache(&broker).await;
    }

    let mut preloaded = None;
    if let Some(target) = &cli.connect {
        let mut store = InventoryStore::new(broker.source.clone(), broker.cache.clone());
        let nodes = store.load(false).await?;
        if nodes.iter().any(|node| node.hostname == *target) {
            let status = broker.connector.run(target)?;
            return Ok(status.code().unwrap_or(1));
        }
        // Unknown target: fall back to browsing the full inventory instead
        // of failing.
        warn!(host = target.as_str(), "requested host not in inventory; opening the browser");
        preloaded = Some(nodes);
    }

    let mut term = terminal::init()?;
    let outcome = app::run_app(&mut term, &broker, preloaded).await;
    terminal::restore();

    match outcome? {
        AppOutcome::Quit => Ok(0),
        AppOutcome::Connect(node) => {
            info!(hostname = node.hostname.as_str(), "selection confirmed");
            let status = broker.connector.run(&node.hostname)?;
            Ok(status.code().unwrap_or(1))
        }
    }
}

async fn populate_node_cache(broker: &Broker) -> Result<i32> {
    let mut store = InventoryStore::new(broker.source.clone(), broker.cache.clone());
    let nodes = store.load(true).await?;
    match &broker.cache_path {
        Some(path) => println!("cached {} nodes to {}", nodes.len(), path.display()),
        None => println!("no node_cache_file configured; nothing persisted"),
    }
    Ok(0)
}

/// Log to a file, never to the terminal the table is drawn on. Filtered by
/// `RUST_LOG`, off by default.
fn init_logging() -> Result<WorkerGuard> {
    let dir = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("hopsh"))
        .ok_or_else(|| eyre!("no writable state directory for logs"))?;
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(dir, "hopsh.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
