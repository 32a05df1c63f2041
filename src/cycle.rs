//! Poll-cycle orchestration.
//!
//! Coordinates one full cycle: acquire reports, select the closest
//! candidate, log a sighting, resolve cached metadata, assemble the
//! display payload, deliver it, and maintain the cache / negative cache.
//! The orchestrator holds no state between cycles; all continuity lives
//! in the [`Store`], so a restart at any point needs no recovery logic.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{Candidate, DisplayPayload, FlightCacheEntry, SeatsTotal, Sighting};
use crate::selector::select_closest;
use crate::sink::DisplaySink;
use crate::source::ReportSource;
use crate::store::Store;

/// Origin/destination code shown when no metadata is cached.
pub const PLACEHOLDER_CODE: &str = "####";
/// Seats figure shown when no seat-class count is known. A string, so the
/// display can tell "unknown" apart from a known zero.
pub const PLACEHOLDER_SEATS: &str = "###";
/// Ident shown when no report survives filtering.
pub const NO_AIRCRAFT_IDENT: &str = "NO_AIRCRAFT";
/// Ident shown when the winning report has neither flight ident nor hex.
pub const UNKNOWN_IDENT: &str = "UNKNOWN";

/// What one cycle did, for logging and tests.
#[derive(Debug)]
pub struct CycleOutcome {
    pub candidate_found: bool,
    pub ident: Option<String>,
    pub distance_km: Option<f64>,
    pub delivered: bool,
    pub stub_written: bool,
}

/// Run one poll cycle end to end.
///
/// An acquisition failure (or a store read failure while resolving
/// metadata) aborts the cycle with `Err`; everything downstream of the
/// sighting write degrades instead of aborting, so a flaky sink or a
/// full disk never blocks the payload from being assembled.
pub async fn run_cycle(
    source: &dyn ReportSource,
    store: &dyn Store,
    sink: &dyn DisplaySink,
    config: &Config,
) -> Result<CycleOutcome> {
    // Acquire. A hard failure here means no writes and no delivery.
    let reports = source.fetch_reports().await?;

    let receiver = config.receiver.location();
    let policy = config.selector.policy();

    let Some(candidate) = select_closest(&reports, &receiver, &policy) else {
        // Nothing overhead worth showing; replace the display state with
        // the placeholder and leave the store untouched.
        let payload = placeholder_payload(Utc::now());
        let delivered = deliver_logged(sink, &payload).await;
        return Ok(CycleOutcome {
            candidate_found: false,
            ident: None,
            distance_km: None,
            delivered,
            stub_written: false,
        });
    };

    let now = Utc::now();
    let now_secs = now.timestamp();
    let ident = candidate.report.normalized_ident();

    // Log the sighting regardless of metadata cache status. A failed
    // insert must not block delivery.
    let sighting = sighting_from(&candidate, ident.as_deref(), now_secs);
    if let Err(e) = store.insert_sighting(&sighting).await {
        warn!(error = %e, "failed to record sighting");
    }

    // Resolve cached metadata and negative-cache freshness.
    let mut meta: Option<FlightCacheEntry> = None;
    let mut miss_fresh = false;
    if let Some(ident) = ident.as_deref() {
        meta = store.get_cache_entry(ident).await?;
        if let Some(miss) = store.get_miss(ident).await? {
            miss_fresh = miss.is_fresh(now_secs, config.cache.negative_ttl_secs());
        }
    }

    let payload = build_payload(&candidate, ident.as_deref(), meta.as_ref(), now);
    let delivered = deliver_logged(sink, &payload).await;

    // Cache maintenance: first time we see an ident with no cache row and
    // no fresh miss, write a stub row and record the miss. The stub marks
    // the ident as considered until a future enrichment call fills it in;
    // the miss defers re-resolution until the negative TTL expires.
    let mut stub_written = false;
    if let Some(ident) = ident.as_deref() {
        if meta.is_none() && !miss_fresh {
            match store
                .upsert_cache_entry(&FlightCacheEntry::stub(ident, now_secs))
                .await
            {
                Ok(()) => {
                    stub_written = true;
                    if let Err(e) = store.record_miss(ident, now_secs).await {
                        warn!(ident, error = %e, "failed to record miss");
                    }
                }
                Err(e) => {
                    warn!(ident, error = %e, "failed to write stub cache entry");
                }
            }
        }
    }

    Ok(CycleOutcome {
        candidate_found: true,
        ident,
        distance_km: Some(candidate.distance_km),
        delivered,
        stub_written,
    })
}

/// Drive cycles forever at the configured period.
///
/// Cycles are serialized: the next tick is not consumed until the current
/// cycle settles, and missed ticks are delayed rather than burst. The
/// first cycle runs immediately. No failure below startup is fatal.
pub async fn run_loop(
    source: &dyn ReportSource,
    store: &dyn Store,
    sink: &dyn DisplaySink,
    config: &Config,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match run_cycle(source, store, sink, config).await {
            Ok(outcome) => {
                info!(
                    ident = outcome.ident.as_deref(),
                    distance_km = outcome.distance_km,
                    delivered = outcome.delivered,
                    stub_written = outcome.stub_written,
                    "cycle complete"
                );
            }
            Err(e) => {
                warn!(error = %e, "cycle aborted");
            }
        }
    }
}

async fn deliver_logged(sink: &dyn DisplaySink, payload: &DisplayPayload) -> bool {
    match sink.deliver(payload).await {
        Ok(()) => true,
        Err(e) => {
            // Sightings and cache writes from this cycle stand; the next
            // tick will replace the display state anyway.
            warn!(error = %e, "display delivery failed");
            false
        }
    }
}

fn sighting_from(candidate: &Candidate, ident: Option<&str>, now_secs: i64) -> Sighting {
    Sighting {
        ident: ident.map(str::to_string),
        hex: candidate.report.hex.clone(),
        // The selector guarantees finite coordinates on the winner.
        lat: candidate.report.lat.unwrap_or(f64::NAN),
        lon: candidate.report.lon.unwrap_or(f64::NAN),
        alt_ft: candidate.report.alt_ft,
        distance_km: candidate.distance_km,
        rssi: candidate.report.rssi,
        seen_seconds: candidate.report.age_seconds,
        ts: now_secs,
    }
}

/// Assemble the outbound payload for a selected candidate.
///
/// Fallback policy: ident falls back to the hex address, then to
/// [`UNKNOWN_IDENT`]; route codes fall back to [`PLACEHOLDER_CODE`];
/// seats to [`PLACEHOLDER_SEATS`] when no seat-class count is cached.
pub fn build_payload(
    candidate: &Candidate,
    ident: Option<&str>,
    meta: Option<&FlightCacheEntry>,
    now: DateTime<Utc>,
) -> DisplayPayload {
    DisplayPayload {
        ident: ident
            .map(str::to_string)
            .or_else(|| candidate.report.hex.clone())
            .unwrap_or_else(|| UNKNOWN_IDENT.to_string()),
        origin: meta
            .and_then(|m| m.origin_code.clone())
            .unwrap_or_else(|| PLACEHOLDER_CODE.to_string()),
        destination: meta
            .and_then(|m| m.destination_code.clone())
            .unwrap_or_else(|| PLACEHOLDER_CODE.to_string()),
        seats_total: meta
            .and_then(|m| m.seats_total())
            .map(SeatsTotal::Count)
            .unwrap_or(SeatsTotal::Unknown(PLACEHOLDER_SEATS)),
        aircraft_type: meta.and_then(|m| m.aircraft_type.clone()),
        distance_km: round2(candidate.distance_km),
        alt_ft: candidate.report.alt_ft,
        ts: format_ts(now),
    }
}

/// Neutral payload for a cycle with no surviving candidate.
pub fn placeholder_payload(now: DateTime<Utc>) -> DisplayPayload {
    DisplayPayload {
        ident: NO_AIRCRAFT_IDENT.to_string(),
        origin: PLACEHOLDER_CODE.to_string(),
        destination: PLACEHOLDER_CODE.to_string(),
        seats_total: SeatsTotal::Unknown(PLACEHOLDER_SEATS),
        aircraft_type: None,
        distance_km: 0.0,
        alt_ft: None,
        ts: format_ts(now),
    }
}

fn format_ts(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
