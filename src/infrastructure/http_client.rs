// HTTP adapter for the remote telemetry endpoint
use crate::application::telemetry_client::{FetchError, TelemetryClient};
use crate::domain::reading::{Reading, ZoneDistribution};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Wire shape of `GET /city_stats/{region}?hours={n}`. The `readings` array
/// is the only part the core consumes; `Option` so its absence can be
/// reported as a protocol error rather than an empty series.
#[derive(Debug, Deserialize)]
struct CityStatsResponse {
    #[serde(default)]
    readings: Option<Vec<WireReading>>,
}

#[derive(Debug, Deserialize)]
struct WireReading {
    timestamp: String,
    power_consumption: f64,
    voltage: f64,
    current: f64,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
    #[serde(default)]
    zone_distribution: Option<WireZoneDistribution>,
    #[serde(default)]
    efficiency_score: Option<f64>,
    #[serde(default)]
    per_capita_consumption: Option<f64>,
    #[serde(default)]
    is_anomaly: Option<bool>,
    #[serde(default)]
    is_peak_hour: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WireZoneDistribution {
    #[serde(default)]
    industrial: f64,
    #[serde(default)]
    residential: f64,
    #[serde(default)]
    commercial: f64,
}

pub struct HttpTelemetryClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTelemetryClient {
    pub fn new(base_url: String, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn stats_url(&self, region_id: &str, window_hours: u32) -> String {
        format!(
            "{}/city_stats/{}?hours={}",
            self.base_url,
            urlencoding::encode(region_id),
            window_hours
        )
    }
}

#[async_trait]
impl TelemetryClient for HttpTelemetryClient {
    async fn fetch(&self, region_id: &str, window_hours: u32) -> Result<Vec<Reading>, FetchError> {
        let url = self.stats_url(region_id, window_hours);
        tracing::debug!(region = region_id, %url, "fetching readings");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!(
                "endpoint answered {status} for {region_id}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        parse_city_stats(&body)
    }
}

/// Decode a city-stats body into domain readings. A body without a
/// `readings` array is a `Protocol` failure, never an empty-but-valid
/// series.
fn parse_city_stats(body: &str) -> Result<Vec<Reading>, FetchError> {
    let response: CityStatsResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Protocol(e.to_string()))?;
    let readings = response
        .readings
        .ok_or_else(|| FetchError::Protocol("response missing readings field".into()))?;
    readings.into_iter().map(to_domain).collect()
}

fn to_domain(wire: WireReading) -> Result<Reading, FetchError> {
    Ok(Reading {
        timestamp: parse_timestamp(&wire.timestamp)?,
        power_consumption: wire.power_consumption,
        voltage: wire.voltage,
        current: wire.current,
        temperature: wire.temperature,
        humidity: wire.humidity,
        zone_distribution: wire.zone_distribution.map(|z| ZoneDistribution {
            industrial: z.industrial,
            residential: z.residential,
            commercial: z.commercial,
        }),
        efficiency_score: wire.efficiency_score,
        per_capita_consumption: wire.per_capita_consumption,
        is_anomaly: wire.is_anomaly.unwrap_or(false),
        is_peak_hour: wire.is_peak_hour,
    })
}

/// The endpoint emits ISO-8601 timestamps, with or without a UTC offset.
/// Offset-less stamps are taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(stamped) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stamped.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| FetchError::Protocol(format!("unparseable timestamp: {raw}")))
}
