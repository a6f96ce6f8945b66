//! Interactive inventory browsing engine: holds the full node inventory and
//! derives the filtered, fuzzy-ranked visible subset that the rendering
//! layer displays. Pure and synchronous; all blocking I/O lives in the
//! collaborators behind [`InventorySource`] and [`NodeCache`].

mod columns;
mod error;
mod filter;
mod node;
mod project;
mod rank;
mod session;
mod store;

pub use columns::Column;
pub use columns::FixedColumn;
pub use columns::OrderedColumns;
pub use columns::PROMOTED_LABEL_KEYS;
pub use error::InventoryError;
pub use filter::FilterState;
pub use node::Node;
pub use project::Viewport;
pub use project::project;
pub use rank::rank;
pub use session::Mode;
pub use session::Session;
pub use session::SessionEvent;
pub use store::InventorySource;
pub use store::InventoryStore;
pub use store::NodeCache;
pub use store::NoopCache;
