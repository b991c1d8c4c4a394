// ── Domain model ──
//
// Routers and services as the dashboard sees them. Normalized from the
// admin API wire types in `convert.rs`; immutable once fetched and
// replaced wholesale on every successful refresh.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Configuration status reported by Traefik for routers and services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[non_exhaustive]
pub enum EntityStatus {
    Enabled,
    Disabled,
    Warning,
    #[default]
    Unknown,
}

impl EntityStatus {
    /// Lenient parse: anything unrecognized maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

/// Service flavor, from the API's `type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[non_exhaustive]
pub enum ServiceKind {
    #[strum(serialize = "loadbalancer")]
    LoadBalancer,
    Weighted,
    Mirroring,
    Failover,
    #[default]
    Unknown,
}

impl ServiceKind {
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

/// Health of a single load-balancer backend as reported in `serverStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerHealth {
    Up,
    Down,
}

/// An HTTP router: a rule bound to a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Router {
    /// Unique name, usually `name@provider`.
    pub name: String,
    pub rule: String,
    /// Target service name, with or without a provider suffix.
    pub service: String,
    pub entry_points: Vec<String>,
    pub status: EntityStatus,
    pub provider: String,
    pub middlewares: Vec<String>,
    pub priority: i64,
    /// Entry points actually receiving traffic.
    pub using: Vec<String>,
    /// TLS options name, if TLS is configured.
    pub tls: Option<String>,
}

/// Primary and fallback of a failover service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failover {
    pub primary: String,
    pub fallback: String,
}

/// An HTTP service: a backend target or group of targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique name, usually `name@provider`.
    pub name: String,
    pub kind: ServiceKind,
    pub status: EntityStatus,
    pub provider: String,
    /// Routers referencing this service.
    pub used_by: Vec<String>,
    /// Load-balancer server URLs, in configuration order.
    pub servers: Vec<String>,
    /// `None` when Traefik reports no health data for the service.
    pub server_status: Option<BTreeMap<String, ServerHealth>>,
    pub failover: Option<Failover>,
}

impl Service {
    pub fn is_failover(&self) -> bool {
        self.kind == ServiceKind::Failover || self.failover.is_some()
    }

    /// Health of one server URL, if reported.
    pub fn server_health(&self, url: &str) -> Option<ServerHealth> {
        self.server_status.as_ref()?.get(url).copied()
    }
}

/// Strip the trailing `@provider` suffix: `whoami@docker` → `whoami`.
pub fn base_name(name: &str) -> &str {
    name.rsplit_once('@').map_or(name, |(base, _)| base)
}

/// Whether `candidate` names the same entity as `target`, either exactly or
/// as `target@provider`.
pub fn names_match(target: &str, candidate: &str) -> bool {
    candidate == target || (candidate.contains('@') && base_name(candidate) == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values_case_insensitively() {
        assert_eq!(EntityStatus::parse("enabled"), EntityStatus::Enabled);
        assert_eq!(EntityStatus::parse("Disabled"), EntityStatus::Disabled);
        assert_eq!(EntityStatus::parse("warning"), EntityStatus::Warning);
        assert_eq!(EntityStatus::parse("something-new"), EntityStatus::Unknown);
    }

    #[test]
    fn service_kind_parses_api_spelling() {
        assert_eq!(ServiceKind::parse("loadbalancer"), ServiceKind::LoadBalancer);
        assert_eq!(ServiceKind::parse("failover"), ServiceKind::Failover);
        assert_eq!(ServiceKind::parse(""), ServiceKind::Unknown);
        assert_eq!(ServiceKind::LoadBalancer.to_string(), "loadbalancer");
    }

    #[test]
    fn base_name_strips_provider() {
        assert_eq!(base_name("service1@file"), "service1");
        assert_eq!(base_name("service1"), "service1");
        assert_eq!(base_name("api@internal@file"), "api@internal");
    }

    #[test]
    fn names_match_requires_provider_boundary() {
        assert!(names_match("service1", "service1"));
        assert!(names_match("service1", "service1@file"));
        assert!(!names_match("service1", "service10@file"));
        assert!(!names_match("service1", "other@file"));
        assert!(names_match("api@internal", "api@internal@file"));
        assert!(!names_match("api", "api@internal@file"));
    }
}
