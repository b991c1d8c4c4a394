//! `traefiktop`: live terminal dashboard for a Traefik reverse proxy.
//!
//! Polls the Traefik admin API for routers and services, resolves a live
//! Up/Down verdict per router, and renders a searchable list with ratatui.
//! Data comes from `traefiktop-core`'s coordinator through a background
//! data bridge.
//!
//! Logs go to a file (default `/tmp/traefiktop.log`) so they never corrupt
//! the terminal UI. With `--headless`, or when stdout is not a terminal,
//! the router table is fetched once and printed as plain text.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod headless;
mod screens;
mod theme;
mod tui;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use traefiktop_config::{Overrides, ResolvedSettings};
use traefiktop_core::{Coordinator, CoordinatorSettings, Credential, HttpGateway, SortMode};

use crate::app::{App, ViewOptions};

/// Live terminal dashboard for Traefik routers and services.
#[derive(Parser, Debug)]
#[command(name = "traefiktop", version, about)]
struct Cli {
    /// Traefik admin API URL (e.g., http://localhost:8080)
    #[arg(short = 'u', long, env = "TRAEFIKTOP_HOST")]
    host: Option<String>,

    /// Config profile to use
    #[arg(short, long, env = "TRAEFIKTOP_PROFILE")]
    profile: Option<String>,

    /// Basic auth credentials as user:password
    #[arg(long = "user", env = "TRAEFIKTOP_USER", value_parser = parse_credential, hide_env_values = true)]
    credential: Option<Credential>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Hide routers matching a pattern (foo*, *foo, *foo*); repeatable
    #[arg(short, long, value_delimiter = ',', action = clap::ArgAction::Append)]
    ignore: Vec<String>,

    /// Auto-refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Initial sort mode: dead or name
    #[arg(short, long, value_parser = parse_sort)]
    sort: Option<SortMode>,

    /// Fetch once, print the router table and exit
    #[arg(long, alias = "oneshot")]
    headless: bool,

    /// Log file path (defaults to /tmp/traefiktop.log)
    #[arg(long, default_value = "/tmp/traefiktop.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_credential(raw: &str) -> Result<Credential, String> {
    Credential::parse(raw).map_err(|e| e.to_string())
}

fn parse_sort(raw: &str) -> Result<SortMode, String> {
    raw.parse()
        .map_err(|_| format!("expected 'dead' or 'name', got '{raw}'"))
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            profile: self.profile.clone(),
            host: self.host.clone(),
            credential: self.credential.clone(),
            insecure: self.insecure,
            timeout: self.timeout,
            refresh_interval: self.refresh,
            ignore: self.ignore.clone(),
            sort: self.sort,
        }
    }
}

/// File-based tracing. Nothing may log to stdout/stderr while the TUI owns
/// the terminal. Hold the returned guard until exit so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "traefiktop={log_level},traefiktop_core={log_level},traefiktop_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("traefiktop.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

async fn run_dashboard(settings: ResolvedSettings) -> Result<()> {
    let gateway = HttpGateway::new(&settings.connection)?;
    let title = settings.endpoint.url.to_string();

    let handle = Coordinator::start(
        settings.endpoint,
        Arc::new(gateway),
        CoordinatorSettings {
            refresh_interval: settings.refresh_interval,
        },
    );

    let mut app = App::new(
        Arc::new(handle.clone()),
        ViewOptions {
            ignore: settings.ignore,
            sort: settings.sort,
            title,
        },
    );
    let result = app.run().await;

    handle.stop().await;
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so a panic during terminal setup still restores it
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = traefiktop_config::load_config()?;
    let settings = traefiktop_config::resolve(&config, &cli.overrides())?;

    info!(
        url = %settings.endpoint.url,
        profile = %settings.profile_name,
        refresh_secs = settings.refresh_interval.as_secs(),
        "starting traefiktop"
    );

    if cli.headless || !std::io::stdout().is_terminal() {
        return headless::run(&settings).await;
    }

    run_dashboard(settings).await
}
