// ── Wire → domain conversions ──
//
// Maps `traefiktop_api::models` responses onto the domain model.
// Unrecognized enum strings degrade to `Unknown` rather than failing the
// whole refresh.

use std::collections::BTreeMap;

use traefiktop_api::models::{RouterResponse, ServiceResponse};

use crate::model::{EntityStatus, Failover, Router, ServerHealth, Service, ServiceKind};

impl From<RouterResponse> for Router {
    fn from(raw: RouterResponse) -> Self {
        Self {
            name: raw.name,
            rule: raw.rule,
            service: raw.service,
            entry_points: raw.entry_points,
            status: EntityStatus::parse(&raw.status),
            provider: raw.provider,
            middlewares: raw.middlewares,
            priority: raw.priority,
            using: raw.using,
            tls: raw.tls.map(|tls| tls.options.unwrap_or_else(|| "default".into())),
        }
    }
}

impl From<ServiceResponse> for Service {
    fn from(raw: ServiceResponse) -> Self {
        let servers = raw
            .load_balancer
            .map(|lb| lb.servers.into_iter().map(|s| s.url).collect())
            .unwrap_or_default();

        let server_status = raw.server_status.map(|statuses| {
            statuses
                .into_iter()
                .map(|(url, state)| {
                    let health = if state.eq_ignore_ascii_case("UP") {
                        ServerHealth::Up
                    } else {
                        ServerHealth::Down
                    };
                    (url, health)
                })
                .collect::<BTreeMap<_, _>>()
        });

        Self {
            name: raw.name,
            kind: raw
                .service_type
                .as_deref()
                .map_or(ServiceKind::Unknown, ServiceKind::parse),
            status: EntityStatus::parse(&raw.status),
            provider: raw.provider,
            used_by: raw.used_by,
            servers,
            server_status,
            failover: raw.failover.map(|f| Failover {
                primary: f.service,
                fallback: f.fallback,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use traefiktop_api::models::{
        FailoverResponse, LoadBalancerResponse, ServerResponse, TlsResponse,
    };

    use super::*;

    #[test]
    fn router_conversion_maps_tls_and_status() {
        let raw = RouterResponse {
            name: "web@docker".into(),
            rule: "Host(`example.com`)".into(),
            service: "web".into(),
            entry_points: vec!["websecure".into()],
            status: "enabled".into(),
            tls: Some(TlsResponse::default()),
            ..RouterResponse::default()
        };

        let router = Router::from(raw);

        assert_eq!(router.status, EntityStatus::Enabled);
        assert_eq!(router.tls.as_deref(), Some("default"));
        assert_eq!(router.entry_points, vec!["websecure".to_owned()]);
    }

    #[test]
    fn service_conversion_normalizes_server_status() {
        let raw = ServiceResponse {
            name: "web@docker".into(),
            status: "enabled".into(),
            service_type: Some("loadbalancer".into()),
            load_balancer: Some(LoadBalancerResponse {
                servers: vec![
                    ServerResponse { url: "http://a".into() },
                    ServerResponse { url: "http://b".into() },
                ],
                ..LoadBalancerResponse::default()
            }),
            server_status: Some(HashMap::from([
                ("http://a".to_owned(), "UP".to_owned()),
                ("http://b".to_owned(), "DOWN".to_owned()),
            ])),
            ..ServiceResponse::default()
        };

        let service = Service::from(raw);

        assert_eq!(service.kind, ServiceKind::LoadBalancer);
        assert_eq!(service.servers, vec!["http://a".to_owned(), "http://b".to_owned()]);
        assert_eq!(service.server_health("http://a"), Some(ServerHealth::Up));
        assert_eq!(service.server_health("http://b"), Some(ServerHealth::Down));
        assert_eq!(service.server_health("http://c"), None);
    }

    #[test]
    fn failover_conversion_keeps_both_legs() {
        let raw = ServiceResponse {
            name: "app@file".into(),
            service_type: Some("failover".into()),
            failover: Some(FailoverResponse {
                service: "main@file".into(),
                fallback: "backup@file".into(),
            }),
            ..ServiceResponse::default()
        };

        let service = Service::from(raw);

        assert!(service.is_failover());
        assert_eq!(
            service.failover,
            Some(Failover {
                primary: "main@file".into(),
                fallback: "backup@file".into(),
            })
        );
    }
}
