//! Configuration for traefiktop.
//!
//! TOML profiles merged with `TRAEFIKTOP_*` environment variables, credential
//! resolution (env var or plaintext), and translation into the runtime types
//! `traefiktop_core` consumes. Command-line flags arrive as [`Overrides`] and
//! win over everything in the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use traefiktop_core::{
    ConnectionOptions, Credential, CredentialError, Endpoint, IgnorePatterns, SortMode,
    TlsVerification,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in config")]
    MissingProfile { profile: String },

    #[error("invalid credentials: {0}")]
    Credential(#[from] CredentialError),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Traefik instances.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Seconds between automatic refreshes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Initial sort mode: "dead" or "name".
    #[serde(default = "default_sort")]
    pub sort: String,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            timeout: default_timeout(),
            sort: default_sort(),
            insecure: false,
        }
    }
}

fn default_refresh_interval() -> u64 {
    10
}
fn default_timeout() -> u64 {
    5
}
fn default_sort() -> String {
    "dead".into()
}

/// A named Traefik instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Admin API base URL (e.g. "http://traefik.lan:8080").
    pub host: Option<String>,

    /// Basic auth username.
    pub username: Option<String>,

    /// Basic auth password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    pub refresh_interval: Option<u64>,

    /// Router-name patterns to hide.
    #[serde(default)]
    pub ignore: Vec<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "traefiktop").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("traefiktop");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` plus environment. A missing file is not an
/// error; defaults apply.
///
/// Nested keys use a double underscore:
/// `TRAEFIKTOP_DEFAULTS__REFRESH_INTERVAL=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TRAEFIKTOP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Resolution ──────────────────────────────────────────────────────

/// Values supplied on the command line. `None` / empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub host: Option<String>,
    pub credential: Option<Credential>,
    /// Only ever turns verification off; `false` defers to the config.
    pub insecure: bool,
    pub timeout: Option<u64>,
    pub refresh_interval: Option<u64>,
    /// Added to the profile's patterns.
    pub ignore: Vec<String>,
    pub sort: Option<SortMode>,
}

/// Everything the binary needs to start a coordinator and a view.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub profile_name: String,
    pub endpoint: Endpoint,
    pub connection: ConnectionOptions,
    pub refresh_interval: Duration,
    pub ignore: IgnorePatterns,
    pub sort: SortMode,
}

/// Merge flags, the selected profile and global defaults, in that order.
///
/// An explicitly requested profile must exist. The implicit default
/// profile may be absent, in which case `--host` must be given.
pub fn resolve(config: &Config, overrides: &Overrides) -> Result<ResolvedSettings, ConfigError> {
    let (profile_name, profile) = select_profile(config, overrides.profile.as_deref())?;

    let host = overrides
        .host
        .as_deref()
        .or(profile.host.as_deref())
        .ok_or_else(|| {
            invalid(
                "host",
                format!("no Traefik API URL configured; pass --host or set profiles.{profile_name}.host"),
            )
        })?;
    let url = parse_host(host)?;

    let credential = match overrides.credential.clone() {
        Some(credential) => Some(credential),
        None => profile_credential(&profile)?,
    };
    let endpoint = Endpoint { url, credential };

    let insecure = overrides.insecure || profile.insecure.unwrap_or(config.defaults.insecure);
    let tls = if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = positive_secs(
        "timeout",
        overrides
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    )?;
    let refresh_interval = positive_secs(
        "refresh_interval",
        overrides
            .refresh_interval
            .or(profile.refresh_interval)
            .unwrap_or(config.defaults.refresh_interval),
    )?;

    let sort = match overrides.sort {
        Some(sort) => sort,
        None => config.defaults.sort.parse().map_err(|_| {
            invalid(
                "sort",
                format!("expected 'dead' or 'name', got '{}'", config.defaults.sort),
            )
        })?,
    };

    let ignore = IgnorePatterns::new(profile.ignore.iter().chain(&overrides.ignore));

    Ok(ResolvedSettings {
        profile_name,
        endpoint,
        connection: ConnectionOptions { tls, timeout },
        refresh_interval,
        ignore,
        sort,
    })
}

fn select_profile(config: &Config, requested: Option<&str>) -> Result<(String, Profile), ConfigError> {
    if let Some(name) = requested {
        return config
            .profiles
            .get(name)
            .cloned()
            .map(|p| (name.to_owned(), p))
            .ok_or_else(|| ConfigError::MissingProfile {
                profile: name.into(),
            });
    }

    let name = config.default_profile.as_deref().unwrap_or("default");
    let profile = config.profiles.get(name).cloned().unwrap_or_default();
    Ok((name.to_owned(), profile))
}

/// Accept bare `host:port` by assuming plain HTTP.
fn parse_host(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{raw}")
    };
    let url = Url::parse(&candidate).map_err(|e| invalid("host", format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid("host", format!("unsupported scheme '{other}'"))),
    }
}

/// Password chain: `password_env` if that variable is set, then plaintext.
fn profile_credential(profile: &Profile) -> Result<Option<Credential>, ConfigError> {
    let Some(ref username) = profile.username else {
        return Ok(None);
    };
    if username.is_empty() {
        return Err(CredentialError::EmptyUsername.into());
    }

    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(Some(Credential::new(username.clone(), SecretString::from(val))));
        }
    }

    let password = profile.password.clone().unwrap_or_default();
    Ok(Some(Credential::new(username.clone(), SecretString::from(password))))
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(invalid(field, "must be at least 1 second"));
    }
    Ok(Duration::from_secs(secs))
}
