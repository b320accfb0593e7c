// Staggered startup loader - sequential cold-start fetch across regions
use crate::application::coordinator::FetchCoordinator;
use crate::domain::region::RegionRegistry;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Runs once at startup: an explicit queue of pending region fetches drained
/// by a single worker with a fixed delay between tasks, bounding peak
/// concurrent outbound requests on cold start.
///
/// The primary region is queued first so the initially selected region has
/// data as soon as possible; the rest follow in registry order. Overlap with
/// an early refresh cycle is resolved by the coordinator's in-flight guard.
pub struct StaggeredLoader {
    coordinator: Arc<FetchCoordinator>,
    queue: VecDeque<String>,
    delay: Duration,
}

impl StaggeredLoader {
    pub fn new(coordinator: Arc<FetchCoordinator>, registry: &RegionRegistry, delay: Duration) -> Self {
        let mut queue = VecDeque::with_capacity(registry.len());
        if let Some(primary) = registry.primary() {
            queue.push_back(primary.id.clone());
        }
        for region in registry.iter().skip(1) {
            queue.push_back(region.id.clone());
        }
        Self {
            coordinator,
            queue,
            delay,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(regions = self.queue.len(), "starting staggered bulk load");
        let mut first = true;
        while let Some(region_id) = self.queue.pop_front() {
            if !first {
                tokio::time::sleep(self.delay).await;
            }
            first = false;
            if let Err(err) = self.coordinator.refresh_region(&region_id, Utc::now()).await {
                tracing::warn!(region = %region_id, error = %err, "bulk load fetch failed");
            }
        }
        tracing::info!("staggered bulk load complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_client::{FetchError, TelemetryClient};
    use crate::domain::reading::Reading;
    use crate::domain::region::Region;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records the region and virtual instant of every fetch.
    struct RecordingClient {
        starts: Mutex<Vec<(String, Instant)>>,
    }

    #[async_trait]
    impl TelemetryClient for RecordingClient {
        async fn fetch(&self, region_id: &str, _hours: u32) -> Result<Vec<Reading>, FetchError> {
            self.starts
                .lock()
                .unwrap()
                .push((region_id.to_string(), Instant::now()));
            Ok(Vec::new())
        }
    }

    fn registry() -> RegionRegistry {
        RegionRegistry::new(
            ["Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata"]
                .iter()
                .map(|id| Region::new(id.to_string(), id.to_string(), "#888888".into()))
                .collect(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_order_with_inter_request_delay() {
        let client = Arc::new(RecordingClient {
            starts: Mutex::new(Vec::new()),
        });
        let coordinator = Arc::new(FetchCoordinator::new(client.clone(), 300, 24));
        let delay = Duration::from_millis(300);

        StaggeredLoader::new(coordinator, &registry(), delay)
            .run()
            .await;

        let starts = client.starts.lock().unwrap();
        let order: Vec<&str> = starts.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata"]);
        for pair in starts.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= delay);
        }
    }
}
