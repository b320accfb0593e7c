// Synchronization core - lifecycle owner and view snapshot assembler
use crate::application::bulk_loader::StaggeredLoader;
use crate::application::coordinator::FetchCoordinator;
use crate::application::scheduler::RefreshScheduler;
use crate::application::status::SyncStatus;
use crate::application::telemetry_client::TelemetryClient;
use crate::domain::region::RegionRegistry;
use crate::domain::snapshot::{RegionView, ViewSnapshot};
use anyhow::Context;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Timing knobs for the core, all explicit so the quantization and
/// scheduling policies are testable in isolation.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub refresh_period: Duration,
    pub bucket_width_secs: i64,
    pub stagger_delay: Duration,
    pub window_hours: u32,
}

/// Owns the coordinator, the shared status, and every recurring task the
/// core spawns: the one-shot staggered loader, the refresh scheduler, and
/// the one-second countdown ticker. `init` starts them, `shutdown` stops
/// them; nothing recurring outlives the core.
pub struct SyncCore {
    coordinator: Arc<FetchCoordinator>,
    registry: RegionRegistry,
    status: Arc<SyncStatus>,
    refresh_tx: mpsc::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncCore {
    /// Build the core and start its background tasks. Must be called from
    /// within a tokio runtime.
    pub fn init(
        client: Arc<dyn TelemetryClient>,
        registry: RegionRegistry,
        settings: SyncSettings,
    ) -> anyhow::Result<Self> {
        let primary = registry
            .primary()
            .context("region registry is empty")?
            .id
            .clone();
        let coordinator = Arc::new(FetchCoordinator::new(
            client,
            settings.bucket_width_secs,
            settings.window_hours,
        ));
        let status = Arc::new(SyncStatus::new(primary, settings.refresh_period.as_secs()));
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let loader = StaggeredLoader::new(
            Arc::clone(&coordinator),
            &registry,
            settings.stagger_delay,
        );
        let scheduler = RefreshScheduler::new(
            Arc::clone(&coordinator),
            registry.ids(),
            settings.refresh_period,
            Arc::clone(&status),
        );

        let ticker_status = Arc::clone(&status);
        let tasks: Vec<JoinHandle<()>> = vec![
            tokio::spawn(loader.run()),
            tokio::spawn(scheduler.run(refresh_rx)),
            tokio::spawn(async move {
                let period = Duration::from_secs(1);
                let mut ticker =
                    tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                loop {
                    ticker.tick().await;
                    ticker_status.tick_countdown();
                }
            }),
        ];

        Ok(Self {
            coordinator,
            registry,
            status,
            refresh_tx,
            tasks: Mutex::new(tasks),
        })
    }

    /// Start an immediate refresh cycle. A trigger arriving while one is
    /// already queued is coalesced with it.
    pub fn trigger_refresh(&self) {
        if self.refresh_tx.try_send(()).is_err() {
            tracing::debug!("manual refresh already queued, coalescing");
        }
    }

    /// Change the selected region. If the new region has no committed data
    /// yet, an on-demand fetch is started for it outside the normal cycle;
    /// other regions are untouched. Returns false for an unknown region.
    pub fn select_region(&self, region_id: &str) -> bool {
        if !self.registry.contains(region_id) {
            return false;
        }
        self.status.select_region(region_id);
        if self.coordinator.committed_series(region_id).is_none() {
            tracing::info!(region = region_id, "selected region has no data, fetching on demand");
            let coordinator = Arc::clone(&self.coordinator);
            let region_id = region_id.to_string();
            tokio::spawn(async move {
                let _ = coordinator.refresh_region(&region_id, Utc::now()).await;
            });
        }
        true
    }

    pub fn dismiss_error(&self) {
        self.status.dismiss_error();
    }

    /// Assemble the stable view-facing snapshot: one entry per region in
    /// registry order, plus global selection, error, and countdown state.
    pub fn snapshot(&self) -> ViewSnapshot {
        let regions = self
            .registry
            .iter()
            .map(|region| RegionView {
                id: region.id.clone(),
                name: region.name.clone(),
                color: region.color.clone(),
                readings: self
                    .coordinator
                    .committed_series(&region.id)
                    .unwrap_or_default(),
                loading: self.coordinator.is_loading(&region.id),
            })
            .collect();
        ViewSnapshot {
            regions,
            selected_region: self.status.selected_region(),
            last_error: self.status.last_cycle_error(),
            seconds_until_refresh: self.status.seconds_until_refresh(),
        }
    }

    /// Abort all recurring tasks. In-flight fetches spawned on demand are
    /// left to settle; only timers and loops are owned here.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        tracing::info!("synchronization core stopped");
    }
}
