//! All UI actions. Actions are the sole mechanism for state mutation.

use traefiktop_core::Snapshot;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Render,
    ToggleHelp,
    /// Ask the data source for an immediate refresh.
    Refresh,
    /// The coordinator published a new snapshot.
    SnapshotUpdated(Snapshot),
}
