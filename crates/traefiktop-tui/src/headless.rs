//! One-shot mode: fetch once, print a plain-text router summary, exit.
//!
//! Used by `--headless` and whenever stdout is not a terminal.

use std::io::Write;

use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use traefiktop_config::ResolvedSettings;
use traefiktop_core::{
    Gateway, HttpGateway, IgnorePatterns, ServiceStatus, Snapshot, SortMode, derive_rows,
    router_health,
};

pub async fn run(settings: &ResolvedSettings) -> Result<()> {
    let gateway =
        HttpGateway::new(&settings.connection).wrap_err("failed to build HTTP client")?;

    let endpoint = &settings.endpoint;
    let (routers, services) = tokio::join!(
        gateway.fetch_routers(endpoint),
        gateway.fetch_services(endpoint),
    );
    let routers = routers.wrap_err("fetching routers")?;
    let services = services.wrap_err("fetching services")?;
    info!(
        routers = routers.len(),
        services = services.len(),
        "headless fetch complete"
    );

    let snapshot = Snapshot::loaded(routers, services);
    let mut stdout = std::io::stdout().lock();
    write_summary(&mut stdout, &snapshot, &settings.ignore, settings.sort)?;
    Ok(())
}

/// One line per visible router: status icon, name, rule, service.
pub fn write_summary(
    out: &mut impl Write,
    snapshot: &Snapshot,
    ignore: &IgnorePatterns,
    sort: SortMode,
) -> std::io::Result<()> {
    let rows = derive_rows(&snapshot.routers, &snapshot.services, ignore, "", sort);
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);

    let mut down = 0;
    for router in &rows {
        let health = router_health(router, &snapshot.services);
        let icon = match health.status {
            ServiceStatus::Up => "✓",
            ServiceStatus::Down => {
                down += 1;
                "✗"
            }
            ServiceStatus::Unknown => "?",
        };
        let service = health
            .active
            .as_ref()
            .map_or(router.service.as_str(), |s| s.name.as_str());
        writeln!(
            out,
            "{icon} {:<width$}  {}  → {service}",
            router.name, router.rule
        )?;
    }

    writeln!(out, "{} routers, {down} down", rows.len())
}
