use hopsh_core::InventoryError;
use hopsh_core::Node;

/// Events delivered to the interactive loop from background tasks.
#[derive(Debug)]
pub(crate) enum AppEvent {
    /// An inventory (re)load completed. `refresh` echoes whether this was a
    /// forced refresh so a failure can be downgraded to a warning when prior
    /// data is still on screen.
    InventoryLoaded {
        refresh: bool,
        result: Result<Vec<Node>, InventoryError>,
    },
}
