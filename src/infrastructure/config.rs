use crate::application::sync_core::SyncSettings;
use crate::domain::region::{Region, RegionRegistry};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub sync: SyncTimings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub base_url: String,
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Timing knobs for the synchronization core. Reference values: 60 s refresh
/// period, 5-minute cache buckets, 300 ms cold-start stagger.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncTimings {
    #[serde(default = "default_refresh_period_secs")]
    pub refresh_period_secs: u64,
    #[serde(default = "default_bucket_width_secs")]
    pub bucket_width_secs: i64,
    #[serde(default = "default_stagger_delay_ms")]
    pub stagger_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegionsConfig {
    #[serde(default)]
    pub regions: Vec<RegionEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegionEntry {
    pub id: String,
    pub name: String,
    pub color: String,
}

fn default_window_hours() -> u32 {
    24
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_refresh_period_secs() -> u64 {
    60
}

fn default_bucket_width_secs() -> i64 {
    300
}

fn default_stagger_delay_ms() -> u64 {
    300
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            refresh_period_secs: default_refresh_period_secs(),
            bucket_width_secs: default_bucket_width_secs(),
            stagger_delay_ms: default_stagger_delay_ms(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl SyncTimings {
    pub fn to_settings(&self, window_hours: u32) -> SyncSettings {
        SyncSettings {
            refresh_period: Duration::from_secs(self.refresh_period_secs),
            bucket_width_secs: self.bucket_width_secs,
            stagger_delay: Duration::from_millis(self.stagger_delay_ms),
            window_hours,
        }
    }
}

pub fn load_telemetry_config() -> anyhow::Result<TelemetryConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/telemetry"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_region_registry() -> anyhow::Result<RegionRegistry> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/regions"))
        .build()?;

    let regions_config: RegionsConfig = settings.try_deserialize()?;
    anyhow::ensure!(
        !regions_config.regions.is_empty(),
        "config/regions defines no regions"
    );
    Ok(RegionRegistry::new(
        regions_config
            .regions
            .into_iter()
            .map(|r| Region::new(r.id, r.name, r.color))
            .collect(),
    ))
}
