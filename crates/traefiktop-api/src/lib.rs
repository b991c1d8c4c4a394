// traefiktop-api: Async Rust client for the Traefik admin API (routers + services)

mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{BasicAuth, TraefikClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
