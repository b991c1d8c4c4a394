//! Data layer between `traefiktop-api` and the terminal UI.
//!
//! - **[`Coordinator`]** starts the background refresh loop and returns a
//!   [`CoordinatorHandle`]. The handle publishes a [`Snapshot`] over a
//!   `tokio::sync::watch` channel and accepts manual refreshes and endpoint
//!   changes.
//!
//! - **[`Gateway`]** is the seam to the network. [`HttpGateway`] talks to the
//!   Traefik admin API; tests substitute scripted implementations.
//!
//! - **[`DataHook`]** is what a view consumes: subscribe plus refresh.
//!
//! - **Derivation** ([`filter`], [`service_status`]) turns a snapshot into
//!   sorted, filtered rows with a live Up/Down verdict per router.

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod hook;
pub mod model;
pub mod service_status;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionOptions, Credential, CredentialError, Endpoint, TlsVerification};
pub use coordinator::{
    Coordinator, CoordinatorHandle, CoordinatorSettings, DEFAULT_REFRESH_INTERVAL,
};
pub use error::{EntityKind, FetchError};
pub use filter::{IgnorePatterns, SortMode, derive_rows, matches_query};
pub use gateway::{Gateway, HttpGateway};
pub use hook::DataHook;
pub use model::{
    EntityStatus, Failover, Router, ServerHealth, Service, ServiceKind, base_name, names_match,
};
pub use service_status::{RouterHealth, ServiceStatus, router_health, service_status};
pub use snapshot::Snapshot;
