//! Wire types for the Traefik admin API (`/api/http/*`).
//!
//! Field names follow the JSON payload (camelCase). Everything except the
//! entity name is defaulted, since Traefik omits empty fields and the exact
//! set varies between providers and versions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Routers ──────────────────────────────────────────────────────────

/// HTTP router, from `GET /api/http/routers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterResponse {
    pub name: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub entry_points: Vec<String>,
    #[serde(default)]
    pub middlewares: Vec<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub tls: Option<TlsResponse>,
    /// One of `enabled`, `disabled`, `warning`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub using: Vec<String>,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub rule_syntax: Option<String>,
}

/// Router TLS section. Only the options name is surfaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsResponse {
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub cert_resolver: Option<String>,
}

// ── Services ─────────────────────────────────────────────────────────

/// HTTP service, from `GET /api/http/services`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub name: String,
    #[serde(default)]
    pub load_balancer: Option<LoadBalancerResponse>,
    #[serde(default)]
    pub failover: Option<FailoverResponse>,
    #[serde(default)]
    pub status: String,
    /// Server URL → `UP` / `DOWN`.
    #[serde(default)]
    pub server_status: Option<HashMap<String, String>>,
    #[serde(default)]
    pub used_by: Vec<String>,
    #[serde(default)]
    pub provider: String,
    /// `loadbalancer`, `weighted`, `mirroring` or `failover`.
    #[serde(default, rename = "type")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerResponse {
    #[serde(default)]
    pub servers: Vec<ServerResponse>,
    #[serde(default)]
    pub health_check: Option<HealthCheckResponse>,
    #[serde(default)]
    pub pass_host_header: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Failover service: `service` is primary, `fallback` takes over when it is down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverResponse {
    pub service: String,
    pub fallback: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn router_tolerates_missing_optional_fields() {
        let router: RouterResponse =
            serde_json::from_str(r#"{"name":"api@internal","service":"api@internal"}"#).unwrap();
        assert_eq!(router.name, "api@internal");
        assert!(router.entry_points.is_empty());
        assert!(router.tls.is_none());
        assert_eq!(router.priority, 0);
    }

    #[test]
    fn router_accepts_huge_priority() {
        let router: RouterResponse = serde_json::from_str(
            r#"{"name":"r","priority":9223372036854775807,"entryPoints":["web"],"ruleSyntax":"v3"}"#,
        )
        .unwrap();
        assert_eq!(router.priority, i64::MAX);
        assert_eq!(router.entry_points, vec!["web".to_owned()]);
        assert_eq!(router.rule_syntax.as_deref(), Some("v3"));
    }

    #[test]
    fn service_reads_type_and_server_status() {
        let service: ServiceResponse = serde_json::from_str(
            r#"{
                "name": "whoami@docker",
                "type": "loadbalancer",
                "status": "enabled",
                "usedBy": ["whoami@docker"],
                "serverStatus": {"http://10.0.0.2:80": "UP"},
                "loadBalancer": {"servers": [{"url": "http://10.0.0.2:80"}]}
            }"#,
        )
        .unwrap();
        assert_eq!(service.service_type.as_deref(), Some("loadbalancer"));
        assert_eq!(service.used_by, vec!["whoami@docker".to_owned()]);
        let lb = service.load_balancer.unwrap();
        assert_eq!(lb.servers[0].url, "http://10.0.0.2:80");
        assert_eq!(
            service.server_status.unwrap().get("http://10.0.0.2:80").map(String::as_str),
            Some("UP")
        );
    }
}
