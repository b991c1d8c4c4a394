//! Data bridge: forwards coordinator snapshots into the TUI action loop.
//!
//! Runs as a background task. Sends the current snapshot first so the
//! screen renders immediately, then one `SnapshotUpdated` per change until
//! cancelled or the coordinator goes away.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use traefiktop_core::DataHook;

use crate::action::Action;

pub async fn spawn_data_bridge(
    hook: Arc<dyn DataHook>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut snapshots = hook.subscribe();

    let initial = snapshots.borrow_and_update().clone();
    if action_tx.send(Action::SnapshotUpdated(initial)).is_err() {
        return;
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("snapshot channel closed");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if action_tx.send(Action::SnapshotUpdated(snapshot)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}
