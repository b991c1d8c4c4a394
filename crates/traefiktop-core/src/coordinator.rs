// ── Data coordinator ──
//
// Owns the snapshot and drives every fetch cycle. One background task
// multiplexes four trigger sources (startup, endpoint change, interval
// timer, manual refresh) into cycles that never overlap for the current
// endpoint. A cycle is tagged with the endpoint generation it started
// under and only commits if that generation is still current.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Endpoint;
use crate::error::FetchError;
use crate::gateway::Gateway;
use crate::model::{Router, Service};
use crate::snapshot::Snapshot;

/// Default auto-refresh cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Timer cadence. Values under one second are raised to one second.
    pub refresh_interval: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Entry point for the background refresh loop.
pub struct Coordinator;

impl Coordinator {
    /// Spawn the coordinator task. The startup cycle fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        endpoint: Endpoint,
        gateway: Arc<dyn Gateway>,
        settings: CoordinatorSettings,
    ) -> CoordinatorHandle {
        CoordinatorHandle::spawn(endpoint, gateway, settings.refresh_interval)
    }
}

// ── Handle ───────────────────────────────────────────────────────

/// Control surface for a running coordinator.
///
/// Cheaply cloneable via `Arc<Inner>`. Dropping the last clone cancels the
/// background task; [`stop`](Self::stop) does the same and waits for it.
#[derive(Clone)]
pub struct CoordinatorHandle {
    inner: Arc<Inner>,
}

struct Inner {
    snapshot_rx: watch::Receiver<Snapshot>,
    refresh_tx: watch::Sender<u64>,
    endpoint_tx: watch::Sender<Endpoint>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl CoordinatorHandle {
    fn spawn(endpoint: Endpoint, gateway: Arc<dyn Gateway>, refresh_interval: Duration) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (refresh_tx, refresh_rx) = watch::channel(0u64);
        let (endpoint_tx, endpoint_rx) = watch::channel(endpoint.clone());
        let cancel = CancellationToken::new();

        let worker = Worker {
            gateway,
            snapshot: snapshot_tx,
            endpoint,
            endpoint_rx,
            refresh_rx,
            period: refresh_interval.max(MIN_REFRESH_INTERVAL),
            cancel: cancel.clone(),
            generation: 0,
            in_flight: false,
            fetches: JoinSet::new(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            inner: Arc::new(Inner {
                snapshot_rx,
                refresh_tx,
                endpoint_tx,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot_rx.clone()
    }

    /// Current snapshot (cheap `Arc` clones).
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot_rx.borrow().clone()
    }

    /// Request an extra cycle outside the timer cadence.
    ///
    /// Bumps the tick counter the task observes. Ticks that land while a
    /// cycle is running are folded into that cycle.
    pub fn refresh(&self) {
        self.inner
            .refresh_tx
            .send_modify(|tick| *tick = tick.wrapping_add(1));
    }

    /// Point the coordinator at a different URL or credential.
    ///
    /// Returns `false` (and does nothing) if the endpoint is unchanged.
    /// Otherwise a new cycle starts immediately, the timer is re-armed and
    /// any cycle still running against the old endpoint is discarded.
    pub fn set_endpoint(&self, endpoint: Endpoint) -> bool {
        self.inner.endpoint_tx.send_if_modified(|current| {
            if *current == endpoint {
                false
            } else {
                *current = endpoint;
                true
            }
        })
    }

    /// Cancel the background task and wait for it to exit.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let task = self
            .inner
            .task
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "coordinator task ended abnormally");
            }
        }
    }
}

// ── Worker ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Startup,
    EndpointChanged,
    Timer,
    Manual,
}

struct CycleOutcome {
    generation: u64,
    routers: Result<Vec<Router>, FetchError>,
    services: Result<Vec<Service>, FetchError>,
}

/// State owned by the background task. The snapshot sender lives here,
/// so this task is the only writer.
struct Worker {
    gateway: Arc<dyn Gateway>,
    snapshot: watch::Sender<Snapshot>,
    endpoint: Endpoint,
    endpoint_rx: watch::Receiver<Endpoint>,
    refresh_rx: watch::Receiver<u64>,
    period: Duration,
    cancel: CancellationToken,
    /// Bumped on every endpoint change.
    generation: u64,
    /// A cycle for the current generation is running.
    in_flight: bool,
    fetches: JoinSet<CycleOutcome>,
}

impl Worker {
    async fn run(mut self) {
        info!(url = %self.endpoint.url, interval = ?self.period, "coordinator started");

        let mut interval = schedule(self.period);
        self.begin_cycle(Trigger::Startup);

        loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break,

                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    self.finish(joined);
                }

                changed = self.endpoint_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.endpoint = self.endpoint_rx.borrow_and_update().clone();
                    self.generation += 1;
                    self.in_flight = false;
                    interval = schedule(self.period);
                    info!(url = %self.endpoint.url, generation = self.generation, "endpoint changed");
                    self.begin_cycle(Trigger::EndpointChanged);
                }

                _ = interval.tick() => self.trigger(Trigger::Timer),

                changed = self.refresh_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.refresh_rx.borrow_and_update();
                    self.trigger(Trigger::Manual);
                }
            }
        }

        self.fetches.abort_all();
        info!("coordinator stopped");
    }

    fn trigger(&mut self, trigger: Trigger) {
        if self.in_flight {
            debug!(?trigger, generation = self.generation, "cycle in flight; trigger coalesced");
            return;
        }
        self.begin_cycle(trigger);
    }

    fn begin_cycle(&mut self, trigger: Trigger) {
        debug!(?trigger, generation = self.generation, "refresh cycle started");

        self.snapshot.send_modify(|snap| {
            snap.loading = true;
            snap.error = None;
        });

        let gateway = Arc::clone(&self.gateway);
        let endpoint = self.endpoint.clone();
        let generation = self.generation;

        self.fetches.spawn(async move {
            let fetch = async {
                tokio::join!(
                    gateway.fetch_routers(&endpoint),
                    gateway.fetch_services(&endpoint),
                )
            };
            match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok((routers, services)) => CycleOutcome {
                    generation,
                    routers,
                    services,
                },
                Err(_) => {
                    let err = FetchError::new("refresh task panicked");
                    CycleOutcome {
                        generation,
                        routers: Err(err.clone()),
                        services: Err(err),
                    }
                }
            }
        });
        self.in_flight = true;
    }

    fn finish(&mut self, joined: Result<CycleOutcome, JoinError>) {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "refresh task ended without a result");
                self.in_flight = false;
                self.snapshot.send_modify(|snap| {
                    snap.loading = false;
                    snap.error = Some(FetchError::new(format!("refresh task failed: {e}")));
                });
                return;
            }
        };

        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                "discarding result fetched under a previous endpoint"
            );
            return;
        }
        self.in_flight = false;

        match (outcome.routers, outcome.services) {
            (Ok(routers), Ok(services)) => {
                let routers: Arc<Vec<Arc<Router>>> =
                    Arc::new(routers.into_iter().map(Arc::new).collect());
                let services: Arc<Vec<Arc<Service>>> =
                    Arc::new(services.into_iter().map(Arc::new).collect());
                debug!(
                    routers = routers.len(),
                    services = services.len(),
                    "refresh cycle complete"
                );

                self.snapshot.send_modify(|snap| {
                    snap.last_updated = Some(next_stamp(snap.last_updated));
                    snap.routers = routers;
                    snap.services = services;
                    snap.loading = false;
                    snap.error = None;
                });
            }
            (Err(error), _) | (Ok(_), Err(error)) => {
                warn!(error = %error, source = ?error.source_kind, "refresh cycle failed");
                self.snapshot.send_modify(|snap| {
                    snap.loading = false;
                    snap.error = Some(error);
                });
            }
        }
    }
}

/// Fixed-rate timer whose first tick is one full period away; the cycle
/// for "now" is always started explicitly.
fn schedule(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Wall-clock stamp that is strictly later than `previous`.
fn next_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::nanoseconds(1),
        _ => now,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::BoxFuture;
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(10);

    // ── Scripted gateway ─────────────────────────────────────────

    #[derive(Clone)]
    struct Reply {
        delay: Duration,
        routers: Result<Vec<Router>, FetchError>,
        services: Result<Vec<Service>, FetchError>,
    }

    impl Reply {
        fn ok(names: &[&str]) -> Self {
            Self {
                delay: Duration::ZERO,
                routers: Ok(names.iter().map(|n| router(n)).collect()),
                services: Ok(vec![Service {
                    name: "svc@file".into(),
                    ..Service::default()
                }]),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                delay: Duration::ZERO,
                routers: Err(FetchError::new(message)),
                services: Err(FetchError::new(message)),
            }
        }

        fn after(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    type Script = Box<dyn Fn(usize, &Endpoint) -> Reply + Send + Sync>;

    struct ScriptedGateway {
        router_calls: AtomicUsize,
        service_calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
        script: Script,
    }

    impl ScriptedGateway {
        fn new(script: impl Fn(usize, &Endpoint) -> Reply + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                router_calls: AtomicUsize::new(0),
                service_calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                script: Box::new(script),
            })
        }

        /// Cycles started so far (one routers call per cycle).
        fn cycles(&self) -> usize {
            self.router_calls.load(Ordering::SeqCst)
        }

        fn max_concurrent(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }
    }

    impl Gateway for ScriptedGateway {
        fn fetch_routers<'a>(
            &'a self,
            endpoint: &'a Endpoint,
        ) -> BoxFuture<'a, Result<Vec<Router>, FetchError>> {
            let cycle = self.router_calls.fetch_add(1, Ordering::SeqCst);
            let reply = (self.script)(cycle, endpoint);
            async move {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(reply.delay).await;
                self.active.fetch_sub(1, Ordering::SeqCst);
                reply.routers
            }
            .boxed()
        }

        fn fetch_services<'a>(
            &'a self,
            endpoint: &'a Endpoint,
        ) -> BoxFuture<'a, Result<Vec<Service>, FetchError>> {
            let cycle = self.service_calls.fetch_add(1, Ordering::SeqCst);
            let reply = (self.script)(cycle, endpoint);
            async move {
                tokio::time::sleep(reply.delay).await;
                reply.services
            }
            .boxed()
        }
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn router(name: &str) -> Router {
        Router {
            name: name.into(),
            service: "svc".into(),
            ..Router::default()
        }
    }

    fn endpoint(url: &str) -> Endpoint {
        Endpoint::new(Url::parse(url).unwrap())
    }

    fn names(snapshot: &Snapshot) -> Vec<String> {
        snapshot.routers.iter().map(|r| r.name.clone()).collect()
    }

    // ── Cycle semantics ──────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn startup_cycle_publishes_data() {
        let gateway = ScriptedGateway::new(|_, _| Reply::ok(&["router1"]));
        let handle = Coordinator::start(
            endpoint("http://traefik:8080"),
            gateway.clone(),
            CoordinatorSettings::default(),
        );
        let mut rx = handle.subscribe();

        assert!(rx.borrow().loading);
        let snap = rx.wait_for(Snapshot::has_data).await.unwrap().clone();

        assert!(!snap.loading);
        assert!(snap.error.is_none());
        assert_eq!(names(&snap), vec!["router1"]);
        assert_eq!(snap.services.len(), 1);
        assert_eq!(gateway.cycles(), 1);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn loading_keeps_previous_data() {
        let gateway = ScriptedGateway::new(|cycle, _| match cycle {
            0 => Reply::ok(&["a"]),
            _ => Reply::ok(&["b"]).after(Duration::from_secs(2)),
        });
        let handle = CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway, INTERVAL);
        let mut rx = handle.subscribe();
        let first = rx.wait_for(Snapshot::has_data).await.unwrap().clone();

        handle.refresh();
        let loading = rx.wait_for(|s| s.loading).await.unwrap().clone();
        assert_eq!(names(&loading), vec!["a"]);
        assert!(loading.error.is_none());
        assert_eq!(loading.last_updated, first.last_updated);

        let done = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert_eq!(names(&done), vec!["b"]);
        assert!(done.last_updated > first.last_updated);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_preserves_previous_data() {
        let gateway = ScriptedGateway::new(|cycle, _| match cycle {
            0 => Reply::ok(&["a", "b"]),
            _ => Reply::failing("boom"),
        });
        let handle = CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway, INTERVAL);
        let mut rx = handle.subscribe();
        let first = rx.wait_for(Snapshot::has_data).await.unwrap().clone();

        handle.refresh();
        let failed = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();

        assert!(!failed.loading);
        assert_eq!(failed.error.as_ref().map(ToString::to_string).as_deref(), Some("boom"));
        assert_eq!(failed.routers, first.routers);
        assert_eq!(failed.services, first.services);
        assert_eq!(failed.last_updated, first.last_updated);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn routers_error_wins_when_both_fail() {
        let gateway = ScriptedGateway::new(|_, _| Reply {
            delay: Duration::ZERO,
            routers: Err(FetchError::new("routers down")),
            services: Err(FetchError::new("services down")),
        });
        let handle = CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway, INTERVAL);
        let mut rx = handle.subscribe();

        let failed = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();

        assert!(!failed.has_data());
        assert_eq!(
            failed.error.as_ref().map(ToString::to_string).as_deref(),
            Some("routers down")
        );
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn services_failure_alone_fails_the_cycle() {
        let gateway = ScriptedGateway::new(|_, _| Reply {
            services: Err(FetchError::new("services down")),
            ..Reply::ok(&["a"])
        });
        let handle = CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway, INTERVAL);
        let mut rx = handle.subscribe();

        let failed = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();

        assert!(failed.routers.is_empty());
        assert_eq!(
            failed.error.as_ref().map(ToString::to_string).as_deref(),
            Some("services down")
        );
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_error_and_advances_timestamp() {
        let gateway = ScriptedGateway::new(|cycle, _| match cycle {
            0 => Reply::failing("unreachable"),
            _ => Reply::ok(&["a"]),
        });
        let handle = CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway, INTERVAL);
        let mut rx = handle.subscribe();

        let failed = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();
        assert!(failed.last_updated.is_none());

        handle.refresh();
        let first_ok = rx.wait_for(Snapshot::has_data).await.unwrap().clone();
        assert!(first_ok.error.is_none());

        handle.refresh();
        let second_ok = rx
            .wait_for(|s| !s.loading && s.last_updated > first_ok.last_updated)
            .await
            .unwrap()
            .clone();
        assert!(second_ok.error.is_none());
        assert!(second_ok.last_updated > first_ok.last_updated);

        handle.stop().await;
    }

    // ── Triggers ─────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn refresh_during_cycle_is_coalesced() {
        let gateway =
            ScriptedGateway::new(|_, _| Reply::ok(&["a"]).after(Duration::from_secs(3)));
        let handle =
            CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway.clone(), INTERVAL);
        let mut rx = handle.subscribe();

        handle.refresh();
        handle.refresh();
        handle.refresh();
        rx.wait_for(Snapshot::has_data).await.unwrap();
        assert_eq!(gateway.cycles(), 1);

        handle.refresh();
        rx.wait_for(|s| s.loading).await.unwrap();
        rx.wait_for(|s| !s.loading).await.unwrap();

        assert_eq!(gateway.cycles(), 2);
        assert_eq!(gateway.max_concurrent(), 1);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_once_per_interval() {
        let gateway = ScriptedGateway::new(|_, _| Reply::ok(&["a"]));
        let handle =
            CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway.clone(), INTERVAL);
        let mut rx = handle.subscribe();
        rx.wait_for(Snapshot::has_data).await.unwrap();
        assert_eq!(gateway.cycles(), 1);

        // Ticks at 10s, 20s and 30s.
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(gateway.cycles(), 4);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(gateway.cycles(), 5);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_skips_ticks_while_cycle_in_flight() {
        let gateway =
            ScriptedGateway::new(|_, _| Reply::ok(&["a"]).after(Duration::from_secs(15)));
        let handle =
            CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway.clone(), INTERVAL);

        // 0s: startup cycle (ends 15s). 10s tick: coalesced. 20s tick: second cycle.
        tokio::time::sleep(Duration::from_secs(25)).await;

        assert_eq!(gateway.cycles(), 2);
        assert_eq!(gateway.max_concurrent(), 1);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stale_results_after_endpoint_change_are_discarded() {
        let gateway = ScriptedGateway::new(|_, endpoint| {
            if endpoint.url.host_str() == Some("old") {
                Reply::ok(&["old-router"]).after(Duration::from_secs(5))
            } else {
                Reply::ok(&["new-router"]).after(Duration::from_secs(1))
            }
        });
        let handle = CoordinatorHandle::spawn(endpoint("http://old:8080"), gateway.clone(), INTERVAL);
        let mut rx = handle.subscribe();
        tokio::task::yield_now().await;

        assert!(handle.set_endpoint(endpoint("http://new:8080")));
        assert!(!handle.set_endpoint(endpoint("http://new:8080")));

        let fresh = rx.wait_for(Snapshot::has_data).await.unwrap().clone();
        assert_eq!(names(&fresh), vec!["new-router"]);

        // The old cycle lands at 5s and must not overwrite anything.
        tokio::time::sleep(Duration::from_secs(6)).await;
        let snap = handle.snapshot();
        assert_eq!(names(&snap), vec!["new-router"]);
        assert_eq!(snap.last_updated, fresh.last_updated);
        assert!(!snap.loading);
        assert_eq!(gateway.cycles(), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn endpoint_change_rearms_timer() {
        let gateway = ScriptedGateway::new(|_, _| Reply::ok(&["a"]));
        let handle = CoordinatorHandle::spawn(endpoint("http://old:8080"), gateway.clone(), INTERVAL);
        handle.subscribe().wait_for(Snapshot::has_data).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(gateway.cycles(), 1);
        assert!(handle.set_endpoint(endpoint("http://new:8080")));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(gateway.cycles(), 2);

        // The original schedule would have ticked at 10s.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(gateway.cycles(), 2);

        // Re-armed schedule: 5s + one interval.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(gateway.cycles(), 3);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_cycle_releases_in_flight_guard() {
        let gateway =
            ScriptedGateway::new(|_, _| Reply::ok(&["a"]).after(Duration::from_secs(60)));
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (_endpoint_tx, endpoint_rx) = watch::channel(endpoint("http://traefik:8080"));
        let (_refresh_tx, refresh_rx) = watch::channel(0u64);
        let mut worker = Worker {
            gateway,
            snapshot: snapshot_tx,
            endpoint: endpoint("http://traefik:8080"),
            endpoint_rx,
            refresh_rx,
            period: INTERVAL,
            cancel: CancellationToken::new(),
            generation: 0,
            in_flight: false,
            fetches: JoinSet::new(),
        };

        worker.begin_cycle(Trigger::Manual);
        assert!(worker.in_flight);

        worker.fetches.abort_all();
        let joined = worker.fetches.join_next().await.unwrap();
        assert!(joined.is_err());
        worker.finish(joined);

        assert!(!worker.in_flight);
        let snap = snapshot_rx.borrow().clone();
        assert!(!snap.loading);
        assert!(snap.error.is_some());

        // The next trigger starts a cycle instead of being coalesced away.
        worker.trigger(Trigger::Manual);
        assert!(worker.in_flight);
        worker.fetches.abort_all();
    }

    // ── Teardown ─────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn stop_tears_down_timer() {
        let gateway = ScriptedGateway::new(|_, _| Reply::ok(&["a"]));
        let handle =
            CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway.clone(), INTERVAL);
        handle.subscribe().wait_for(Snapshot::has_data).await.unwrap();

        handle.stop().await;
        handle.refresh();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(gateway.cycles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_last_handle_cancels_task() {
        let gateway = ScriptedGateway::new(|_, _| Reply::ok(&["a"]));
        let handle =
            CoordinatorHandle::spawn(endpoint("http://traefik:8080"), gateway.clone(), INTERVAL);
        handle.subscribe().wait_for(Snapshot::has_data).await.unwrap();

        drop(handle);
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(gateway.cycles(), 1);
    }

    #[test]
    fn stamps_strictly_increase() {
        let far_future = Utc::now() + chrono::Duration::hours(1);
        let next = next_stamp(Some(far_future));
        assert!(next > far_future);
        assert!(next_stamp(None) <= Utc::now());
    }
}
