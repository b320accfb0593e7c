// Shared cycle status - selection, countdown, aggregated cycle error
use std::sync::Mutex;

struct StatusInner {
    selected_region: String,
    last_cycle_error: Option<String>,
    seconds_until_refresh: u64,
}

/// Global view-facing bookkeeping shared between the scheduler, the
/// countdown ticker, and the exposed surface. One synchronous lock, never
/// held across an await.
pub struct SyncStatus {
    inner: Mutex<StatusInner>,
}

impl SyncStatus {
    pub fn new(selected_region: String, period_secs: u64) -> Self {
        Self {
            inner: Mutex::new(StatusInner {
                selected_region,
                last_cycle_error: None,
                seconds_until_refresh: period_secs,
            }),
        }
    }

    pub fn selected_region(&self) -> String {
        self.inner.lock().unwrap().selected_region.clone()
    }

    pub fn select_region(&self, region_id: &str) {
        self.inner.lock().unwrap().selected_region = region_id.to_string();
    }

    /// Record the aggregate outcome of one refresh cycle: a failed cycle
    /// surfaces one message, a fully successful cycle clears it.
    pub fn set_cycle_error(&self, error: Option<String>) {
        self.inner.lock().unwrap().last_cycle_error = error;
    }

    pub fn last_cycle_error(&self) -> Option<String> {
        self.inner.lock().unwrap().last_cycle_error.clone()
    }

    pub fn dismiss_error(&self) {
        self.inner.lock().unwrap().last_cycle_error = None;
    }

    /// Reset the countdown to the full period at the start of a cycle,
    /// manual or automatic.
    pub fn reset_countdown(&self, period_secs: u64) {
        self.inner.lock().unwrap().seconds_until_refresh = period_secs;
    }

    pub fn tick_countdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.seconds_until_refresh = inner.seconds_until_refresh.saturating_sub(1);
    }

    pub fn seconds_until_refresh(&self) -> u64 {
        self.inner.lock().unwrap().seconds_until_refresh
    }
}
