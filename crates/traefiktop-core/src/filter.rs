// ── Row derivation ──
//
// Turns a snapshot into the ordered router rows the list view shows:
// ignore patterns first, then the search query, then the sort mode.

use std::cmp::Ordering;
use std::sync::Arc;

use strum::{Display, EnumString};

use crate::model::{Router, Service};
use crate::service_status::router_health;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortMode {
    /// Down routers first, then up, then unknown; ties by name.
    #[default]
    Dead,
    Name,
}

impl SortMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Dead => Self::Name,
            Self::Name => Self::Dead,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Contains(String),
    Prefix(String),
    Suffix(String),
}

impl Pattern {
    fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        let pattern = match (lower.strip_prefix('*'), lower.strip_suffix('*')) {
            (Some(_), Some(_)) if lower.len() >= 2 => {
                Self::Contains(lower[1..lower.len() - 1].to_owned())
            }
            (Some(rest), None) => Self::Suffix(rest.to_owned()),
            (None, Some(rest)) => Self::Prefix(rest.to_owned()),
            _ => Self::Contains(lower.trim_matches('*').to_owned()),
        };
        match &pattern {
            Self::Contains(s) | Self::Prefix(s) | Self::Suffix(s) if s.is_empty() => None,
            _ => Some(pattern),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Contains(s) => name.contains(s.as_str()),
            Self::Prefix(s) => name.starts_with(s.as_str()),
            Self::Suffix(s) => name.ends_with(s.as_str()),
        }
    }
}

/// Case-insensitive router-name patterns hidden from the list.
///
/// `foo*` is a prefix, `*foo` a suffix, `*foo*` and plain `foo` are
/// substrings. Empty patterns are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnorePatterns {
    patterns: Vec<Pattern>,
}

impl IgnorePatterns {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: raw
                .into_iter()
                .filter_map(|p| Pattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_ignored(&self, router_name: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let name = router_name.to_lowercase();
        self.patterns.iter().any(|p| p.matches(&name))
    }
}

/// Case-insensitive substring match on name, rule and service. An empty
/// query matches everything.
pub fn matches_query(router: &Router, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [&router.name, &router.rule, &router.service]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Visible rows, in display order.
pub fn derive_rows(
    routers: &[Arc<Router>],
    services: &[Arc<Service>],
    ignore: &IgnorePatterns,
    query: &str,
    sort: SortMode,
) -> Vec<Arc<Router>> {
    let mut rows: Vec<Arc<Router>> = routers
        .iter()
        .filter(|r| !ignore.is_ignored(&r.name) && matches_query(r, query))
        .cloned()
        .collect();

    match sort {
        SortMode::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        SortMode::Dead => {
            let mut ranked: Vec<(u8, Arc<Router>)> = rows
                .into_iter()
                .map(|r| (router_health(&r, services).status.severity_rank(), r))
                .collect();
            ranked.sort_by(|(ra, a), (rb, b)| match ra.cmp(rb) {
                Ordering::Equal => a.name.cmp(&b.name),
                other => other,
            });
            rows = ranked.into_iter().map(|(_, r)| r).collect();
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ServerHealth;

    fn router(name: &str, rule: &str, service: &str) -> Arc<Router> {
        Arc::new(Router {
            name: name.into(),
            rule: rule.into(),
            service: service.into(),
            ..Router::default()
        })
    }

    fn service(name: &str, up: bool) -> Arc<Service> {
        let health = if up { ServerHealth::Up } else { ServerHealth::Down };
        Arc::new(Service {
            name: name.into(),
            server_status: Some(BTreeMap::from([("http://x".to_owned(), health)])),
            ..Service::default()
        })
    }

    fn names(rows: &[Arc<Router>]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn ignore_pattern_shapes() {
        let ignore = IgnorePatterns::new(["Internal*", "*@internal", "*debug*", "acme"]);
        assert!(ignore.is_ignored("internal-api@docker"));
        assert!(ignore.is_ignored("dashboard@internal"));
        assert!(ignore.is_ignored("my-DEBUG-router"));
        assert!(ignore.is_ignored("le-acme-http"));
        assert!(!ignore.is_ignored("web@docker"));
    }

    #[test]
    fn blank_patterns_are_dropped() {
        let ignore = IgnorePatterns::new(["", "*", "**", "  "]);
        assert!(ignore.is_empty());
        assert!(!ignore.is_ignored("anything"));
    }

    #[test]
    fn query_matches_name_rule_or_service() {
        let r = router("router1@file", "Host(`Example.com`)", "service1");
        assert!(matches_query(&r, ""));
        assert!(matches_query(&r, "ROUTER1"));
        assert!(matches_query(&r, "example.com"));
        assert!(matches_query(&r, "service1"));
        assert!(!matches_query(&r, "router2"));
    }

    #[test]
    fn dead_sort_puts_down_routers_first() {
        let routers = vec![
            router("b-up", "", "ok"),
            router("a-unknown", "", "missing"),
            router("c-down", "", "broken"),
            router("a-up", "", "ok"),
        ];
        let services = vec![service("ok@file", true), service("broken@file", false)];

        let rows = derive_rows(&routers, &services, &IgnorePatterns::default(), "", SortMode::Dead);
        assert_eq!(names(&rows), vec!["c-down", "a-up", "b-up", "a-unknown"]);

        let rows = derive_rows(&routers, &services, &IgnorePatterns::default(), "", SortMode::Name);
        assert_eq!(names(&rows), vec!["a-unknown", "a-up", "b-up", "c-down"]);
    }

    #[test]
    fn ignore_then_query_then_sort() {
        let routers = vec![
            router("web@docker", "Host(`web`)", "web"),
            router("api@docker", "Host(`api`)", "api"),
            router("api@internal", "PathPrefix(`/api`)", "api@internal"),
        ];
        let ignore = IgnorePatterns::new(["*@internal"]);

        let rows = derive_rows(&routers, &[], &ignore, "api", SortMode::Name);
        assert_eq!(names(&rows), vec!["api@docker"]);
    }

    #[test]
    fn sort_mode_toggles_and_parses() {
        assert_eq!(SortMode::default(), SortMode::Dead);
        assert_eq!(SortMode::Dead.toggle(), SortMode::Name);
        assert_eq!(SortMode::Name.toggle(), SortMode::Dead);
        assert_eq!("NAME".parse::<SortMode>().ok(), Some(SortMode::Name));
        assert_eq!(SortMode::Dead.to_string(), "dead");
    }
}
