// ── Service status resolution ──
//
// Derives a live Up/Down verdict for services and routers from the
// fetched lists. Failover services resolve through their primary, then
// their fallback. Reference cycles resolve to `Unknown`.

use std::collections::HashSet;
use std::sync::Arc;

use strum::Display;

use crate::model::{EntityStatus, Router, ServerHealth, Service, names_match};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceStatus {
    Up,
    Down,
    Unknown,
}

impl ServiceStatus {
    /// Rank used by the "dead first" sort: Down, then Up, then Unknown.
    pub fn severity_rank(self) -> u8 {
        match self {
            Self::Down => 0,
            Self::Up => 1,
            Self::Unknown => 2,
        }
    }
}

/// Look a service up by name. An exact match wins; otherwise the first
/// `name@provider` entry is taken.
pub fn find_service<'a>(name: &str, services: &'a [Arc<Service>]) -> Option<&'a Arc<Service>> {
    services
        .iter()
        .find(|s| s.name == name)
        .or_else(|| services.iter().find(|s| names_match(name, &s.name)))
}

/// Resolve the primary and fallback of a failover service.
pub fn failover_targets<'a>(
    service: &Service,
    services: &'a [Arc<Service>],
) -> (Option<&'a Arc<Service>>, Option<&'a Arc<Service>>) {
    match &service.failover {
        Some(failover) => (
            find_service(&failover.primary, services),
            find_service(&failover.fallback, services),
        ),
        None => (None, None),
    }
}

/// Status of one service.
pub fn service_status(service: &Service, services: &[Arc<Service>]) -> ServiceStatus {
    resolve(service, services, &mut HashSet::new())
}

fn resolve<'a>(
    service: &'a Service,
    services: &'a [Arc<Service>],
    visiting: &mut HashSet<&'a str>,
) -> ServiceStatus {
    if !visiting.insert(service.name.as_str()) {
        return ServiceStatus::Unknown;
    }

    let status = if service.is_failover() {
        let (primary, fallback) = failover_targets(service, services);
        let primary = primary.map_or(ServiceStatus::Unknown, |s| resolve(s, services, visiting));
        if primary == ServiceStatus::Up {
            ServiceStatus::Up
        } else {
            let fallback =
                fallback.map_or(ServiceStatus::Unknown, |s| resolve(s, services, visiting));
            match (primary, fallback) {
                (_, ServiceStatus::Up) => ServiceStatus::Up,
                (ServiceStatus::Down, _) | (_, ServiceStatus::Down) => ServiceStatus::Down,
                _ => ServiceStatus::Unknown,
            }
        }
    } else {
        own_status(service)
    };

    visiting.remove(service.name.as_str());
    status
}

/// Status of a non-failover service from its own health data.
fn own_status(service: &Service) -> ServiceStatus {
    match &service.server_status {
        Some(servers) if servers.values().any(|h| *h == ServerHealth::Up) => ServiceStatus::Up,
        Some(servers) if !servers.is_empty() => ServiceStatus::Down,
        Some(_) => ServiceStatus::Unknown,
        None => match service.status {
            EntityStatus::Enabled => ServiceStatus::Up,
            EntityStatus::Disabled => ServiceStatus::Down,
            _ => ServiceStatus::Unknown,
        },
    }
}

/// Services a router forwards to: `router.service` with or without an
/// `@provider` suffix.
pub fn router_services<'a>(router: &Router, services: &'a [Arc<Service>]) -> Vec<&'a Arc<Service>> {
    services
        .iter()
        .filter(|s| names_match(&router.service, &s.name))
        .collect()
}

/// Router-level verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterHealth {
    pub status: ServiceStatus,
    /// The first service currently answering for the router. For a
    /// failover service this is whichever side is up.
    pub active: Option<Arc<Service>>,
    /// How many matched services are up.
    pub alive: usize,
}

pub fn router_health(router: &Router, services: &[Arc<Service>]) -> RouterHealth {
    let matched = router_services(router, services);
    let mut alive = 0;
    let mut active: Option<Arc<Service>> = None;

    for svc in &matched {
        let answering = if svc.is_failover() {
            let (primary, fallback) = failover_targets(svc, services);
            primary
                .filter(|p| service_status(p, services) == ServiceStatus::Up)
                .or_else(|| fallback.filter(|f| service_status(f, services) == ServiceStatus::Up))
        } else if service_status(svc, services) == ServiceStatus::Up {
            Some(*svc)
        } else {
            None
        };

        if let Some(up) = answering {
            alive += 1;
            if active.is_none() {
                active = Some(Arc::clone(up));
            }
        }
    }

    let status = if alive > 0 {
        ServiceStatus::Up
    } else if matched.is_empty() {
        ServiceStatus::Unknown
    } else {
        ServiceStatus::Down
    };

    RouterHealth {
        status,
        active,
        alive,
    }
}
