//! Position report acquisition.
//!
//! [`HttpReportSource`] polls a dump1090-style `aircraft` endpoint and
//! validates the loosely structured JSON into [`PositionReport`]s exactly
//! once, at this boundary. Individual malformed records degrade to absent
//! optional fields instead of failing the batch; a non-2xx response or
//! unparseable body fails the whole fetch.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::models::PositionReport;

/// Supplies the current batch of position reports, once per cycle.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_reports(&self) -> Result<Vec<PositionReport>>;
}

/// HTTP GET source for a dump1090-fa style JSON feed.
pub struct HttpReportSource {
    client: reqwest::Client,
    url: String,
}

impl HttpReportSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch_reports(&self) -> Result<Vec<PositionReport>> {
        let response = self
            .client
            .get(&self.url)
            .header("cache-control", "no-cache")
            .send()
            .await
            .with_context(|| format!("aircraft fetch failed: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("aircraft fetch failed: {} {}", status, body);
        }

        let json: Value = response
            .json()
            .await
            .context("aircraft feed is not valid JSON")?;

        Ok(parse_feed(&json))
    }
}

/// Extract the report array from a feed document. A missing or non-array
/// `aircraft` field reads as an empty batch.
pub fn parse_feed(feed: &Value) -> Vec<PositionReport> {
    feed.get("aircraft")
        .and_then(Value::as_array)
        .map(|records| records.iter().map(report_from_value).collect())
        .unwrap_or_default()
}

/// Validate one raw feed record into a [`PositionReport`].
///
/// Wrong-typed fields become `None`; the selector's gates do the rest.
fn report_from_value(record: &Value) -> PositionReport {
    PositionReport {
        flight: record
            .get("flight")
            .and_then(Value::as_str)
            .map(str::to_string),
        hex: record
            .get("hex")
            .and_then(Value::as_str)
            .map(str::to_string),
        lat: record.get("lat").and_then(Value::as_f64),
        lon: record.get("lon").and_then(Value::as_f64),
        alt_ft: altitude_ft(record.get("alt_baro")),
        // seen_pos is the age of the position fix; seen is the age of any
        // message and is only a fallback.
        age_seconds: record
            .get("seen_pos")
            .and_then(Value::as_f64)
            .or_else(|| record.get("seen").and_then(Value::as_f64)),
        accuracy: record
            .get("nac_p")
            .and_then(Value::as_u64)
            .map(|v| v as u32),
        rssi: record.get("rssi").and_then(Value::as_f64),
    }
}

/// dump1090 reports `alt_baro` in feet, or the string `"ground"`.
fn altitude_ft(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(|f| f.round() as i64),
        Some(Value::String(s)) if s == "ground" => Some(0),
        _ => None,
    }
}
