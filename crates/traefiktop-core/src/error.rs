// ── Fetch failure ──
//
// The one error kind a refresh cycle can end in. Transport, HTTP and parse
// failures from either endpoint all collapse into it; the message is shown
// to the user verbatim as `Error: <message>`.

use thiserror::Error;

/// Which list endpoint a failure came from. Kept for logging only; the
/// rendered message does not distinguish the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Routers,
    Services,
}

/// A failed fetch, stored in the snapshot until the next cycle starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    pub source_kind: Option<EntityKind>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source_kind: None,
        }
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.source_kind = Some(kind);
        self
    }
}

impl From<traefiktop_api::Error> for FetchError {
    fn from(err: traefiktop_api::Error) -> Self {
        match err {
            traefiktop_api::Error::Transport(ref e) if e.is_timeout() => {
                Self::new(format!("request timed out: {e}"))
            }
            traefiktop_api::Error::Transport(ref e) if e.is_connect() => {
                Self::new(format!("cannot connect to Traefik API: {e}"))
            }
            traefiktop_api::Error::Deserialization { message, .. } => {
                Self::new(format!("unexpected response from Traefik API: {message}"))
            }
            other => Self::new(other.to_string()),
        }
    }
}
