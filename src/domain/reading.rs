// Telemetry reading domain models
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-zone power consumption breakdown for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneDistribution {
    pub industrial: f64,
    pub residential: f64,
    pub commercial: f64,
}

/// One telemetry sample for a region. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub power_consumption: f64,
    pub voltage: f64,
    pub current: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_distribution: Option<ZoneDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_capita_consumption: Option<f64>,
    pub is_anomaly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_peak_hour: Option<bool>,
}

/// Ordered sequence of readings for one region, oldest first.
///
/// Produced atomically per fetch and replaced wholesale on commit, never
/// mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReadingSeries {
    readings: Vec<Reading>,
}

impl ReadingSeries {
    /// Build a series from readings in arbitrary order. The telemetry
    /// endpoint returns newest-first; the series is always ascending.
    pub fn from_unordered(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }
}
