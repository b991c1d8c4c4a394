// ── Snapshot ──
//
// The coordinator's published state. Lists are `Arc`-shared so observers
// clone a snapshot for the price of a few refcount bumps.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::model::{Router, Service};

/// Current view of fetched state.
///
/// `routers` and `services` always hold the last successfully fetched
/// values; they are never cleared while a cycle is loading or after one
/// fails.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub routers: Arc<Vec<Arc<Router>>>,
    pub services: Arc<Vec<Arc<Service>>>,
    pub loading: bool,
    pub error: Option<FetchError>,
    /// Completion time of the last successful cycle.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    /// Fresh coordinator state: nothing fetched yet, first cycle pending.
    fn default() -> Self {
        Self {
            routers: Arc::new(Vec::new()),
            services: Arc::new(Vec::new()),
            loading: true,
            error: None,
            last_updated: None,
        }
    }
}

impl Snapshot {
    /// Whether at least one cycle has succeeded.
    pub fn has_data(&self) -> bool {
        self.last_updated.is_some()
    }

    /// How long ago the last successful refresh completed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_updated.map(|t| Utc::now() - t)
    }

    /// Build a loaded snapshot from plain lists. Handy for hosts and tests
    /// that don't run a coordinator.
    pub fn loaded(routers: Vec<Router>, services: Vec<Service>) -> Self {
        Self {
            routers: Arc::new(routers.into_iter().map(Arc::new).collect()),
            services: Arc::new(services.into_iter().map(Arc::new).collect()),
            loading: false,
            error: None,
            last_updated: Some(Utc::now()),
        }
    }

    /// A snapshot whose very first cycle failed.
    pub fn failed(error: FetchError) -> Self {
        Self {
            loading: false,
            error: Some(error),
            ..Self::default()
        }
    }
}
