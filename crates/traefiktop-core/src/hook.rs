// ── Data hook ──
//
// What a view needs from its data source: a snapshot stream and a way to
// ask for a refresh. The list view takes an `Arc<dyn DataHook>` so tests
// can drive it without a coordinator.

use tokio::sync::watch;

use crate::coordinator::CoordinatorHandle;
use crate::snapshot::Snapshot;

pub trait DataHook: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Snapshot>;

    fn refresh(&self);
}

impl DataHook for CoordinatorHandle {
    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        CoordinatorHandle::subscribe(self)
    }

    fn refresh(&self) {
        CoordinatorHandle::refresh(self);
    }
}
