// Refresh scheduler - recurring concurrent fan-out over all regions
use crate::application::coordinator::FetchCoordinator;
use crate::application::status::SyncStatus;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Drives one refresh cycle per period, fetching every region in parallel,
/// unlike the sequential startup loader.
///
/// A manual trigger runs a cycle immediately and resets the timer phase so
/// the next automatic tick lands exactly one period later.
pub struct RefreshScheduler {
    coordinator: Arc<FetchCoordinator>,
    region_ids: Vec<String>,
    period: Duration,
    status: Arc<SyncStatus>,
}

impl RefreshScheduler {
    pub fn new(
        coordinator: Arc<FetchCoordinator>,
        region_ids: Vec<String>,
        period: Duration,
        status: Arc<SyncStatus>,
    ) -> Self {
        Self {
            coordinator,
            region_ids,
            period,
            status,
        }
    }

    /// Loop until the manual-trigger channel closes (core shutdown). The
    /// first automatic cycle fires one full period after start; cold-start
    /// loading is the bulk loader's job.
    pub async fn run(self, mut manual_rx: mpsc::Receiver<()>) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                trigger = manual_rx.recv() => {
                    match trigger {
                        Some(()) => {
                            tracing::info!("manual refresh triggered");
                            ticker.reset();
                            self.run_cycle().await;
                        }
                        None => break,
                    }
                }
            }
        }
    }

    /// One refresh cycle: reset the countdown, fetch all regions
    /// concurrently, record the aggregate outcome.
    async fn run_cycle(&self) {
        self.status.reset_countdown(self.period.as_secs());
        let started = Utc::now();
        let results = join_all(self.region_ids.iter().map(|region_id| {
            let coordinator = Arc::clone(&self.coordinator);
            async move {
                (
                    region_id.as_str(),
                    coordinator.refresh_region(region_id, started).await,
                )
            }
        }))
        .await;

        let failures: Vec<_> = results
            .iter()
            .filter_map(|(id, result)| result.as_ref().err().map(|err| (*id, err)))
            .collect();

        if let Some((first_id, first_err)) = failures.first() {
            let message = format!(
                "{} of {} regions failed to refresh ({}: {})",
                failures.len(),
                self.region_ids.len(),
                first_id,
                first_err
            );
            tracing::warn!(failed = failures.len(), "refresh cycle incomplete");
            self.status.set_cycle_error(Some(message));
        } else {
            self.status.set_cycle_error(None);
            tracing::debug!(regions = self.region_ids.len(), "refresh cycle complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_client::{FetchError, TelemetryClient};
    use crate::domain::reading::Reading;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        calls: AtomicUsize,
        /// Region id to fail, or "*" to fail every fetch.
        fail_region: Option<String>,
    }

    #[async_trait]
    impl TelemetryClient for CountingClient {
        async fn fetch(&self, region_id: &str, _hours: u32) -> Result<Vec<Reading>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_region.as_deref() {
                Some(fail) if fail == "*" || fail == region_id => {
                    Err(FetchError::Network("timed out".into()))
                }
                _ => Ok(Vec::new()),
            }
        }
    }

    fn scheduler(
        client: Arc<CountingClient>,
        period: Duration,
    ) -> (RefreshScheduler, Arc<SyncStatus>) {
        // Bucket width of 1s keeps every test cycle in a fresh bucket.
        let coordinator = Arc::new(FetchCoordinator::new(client, 1, 24));
        let status = Arc::new(SyncStatus::new("Mumbai".into(), period.as_secs()));
        let regions = vec!["Mumbai".to_string(), "Delhi".to_string()];
        (
            RefreshScheduler::new(coordinator, regions, period, status.clone()),
            status,
        )
    }

    #[tokio::test]
    async fn test_cycle_fetches_every_region() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            fail_region: None,
        });
        let (scheduler, status) = scheduler(client.clone(), Duration::from_secs(60));

        scheduler.run_cycle().await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert!(status.last_cycle_error().is_none());
        assert_eq!(status.seconds_until_refresh(), 60);
    }

    #[tokio::test]
    async fn test_partial_failure_surfaces_one_aggregate_error() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            fail_region: Some("Delhi".to_string()),
        });
        let (scheduler, status) = scheduler(client, Duration::from_secs(60));

        scheduler.run_cycle().await;
        let error = status.last_cycle_error().unwrap();
        assert!(error.contains("1 of 2 regions failed"), "got: {error}");
        assert!(error.contains("Delhi"));
    }

    #[tokio::test]
    async fn test_successful_cycle_clears_prior_error() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            fail_region: None,
        });
        let (scheduler, status) = scheduler(client, Duration::from_secs(60));

        status.set_cycle_error(Some("2 of 2 regions failed to refresh".into()));
        scheduler.run_cycle().await;
        assert!(status.last_cycle_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_resets_timer_phase() {
        // Every fetch fails so nothing is cached and every cycle reaches the
        // client, making call counts an exact record of cycle starts.
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            fail_region: Some("*".to_string()),
        });
        let (scheduler, _status) = scheduler(client.clone(), Duration::from_secs(60));
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(scheduler.run(rx));

        // Manual trigger at t=30s runs a cycle immediately.
        tokio::time::sleep(Duration::from_secs(30)).await;
        tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);

        // The old t=60s tick must not fire; next automatic cycle is t=90s.
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 4);

        task.abort();
    }
}
