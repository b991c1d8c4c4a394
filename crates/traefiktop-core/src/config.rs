// ── Runtime connection configuration ──
//
// These types describe *where* and *how* to reach a Traefik admin API.
// They carry credential data and connection tuning, but never touch disk.
// The binary builds them (via `traefiktop-config`) and hands them in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Basic auth credential for a protected admin API.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("expected credentials in the form 'user:password'")]
    MissingSeparator,
    #[error("username must not be empty")]
    EmptyUsername,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Parse `user:password`. Only the first `:` separates; the password
    /// may contain further colons.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let (user, password) = raw
            .split_once(':')
            .ok_or(CredentialError::MissingSeparator)?;
        if user.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }
        Ok(Self::new(user, SecretString::from(password.to_owned())))
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl Eq for Credential {}

/// The (base URL, credential) pair every fetch cycle runs against.
///
/// Changing either half is a parameter change for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    pub credential: Option<Credential>,
}

impl Endpoint {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Connection tuning for the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(5),
        }
    }
}
