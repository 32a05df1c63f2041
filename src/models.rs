//! Core data models for the display feeder.
//!
//! These types represent the position reports, selection results, and
//! persisted rows that flow through the poll cycle.

use serde::Serialize;

/// A single aircraft position report, validated at the source boundary.
///
/// Every field comes straight from the receiver feed; missing or malformed
/// values are represented as `None` rather than being rejected, so a
/// partially broken record can still be filtered out (not selected) without
/// failing the whole batch.
#[derive(Debug, Clone, Default)]
pub struct PositionReport {
    /// Raw flight ident as broadcast, untrimmed (e.g. `"ASA123  "`).
    pub flight: Option<String>,
    /// ICAO 24-bit address as a hex string.
    pub hex: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Barometric altitude in feet. `"ground"` in the feed maps to 0.
    pub alt_ft: Option<i64>,
    /// Seconds since the last position fix (`seen_pos`, falling back to `seen`).
    pub age_seconds: Option<f64>,
    /// Navigation accuracy category for position (`nac_p`); higher is better.
    pub accuracy: Option<u32>,
    /// Signal strength in dBFS.
    pub rssi: Option<f64>,
}

impl PositionReport {
    /// Trimmed flight ident, or `None` when absent or blank.
    ///
    /// The hex address is never a substitute here: it is a display-only
    /// fallback and must not be used as a cache key.
    pub fn normalized_ident(&self) -> Option<String> {
        self.flight
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Fixed receiver location the distance is measured from.
#[derive(Debug, Clone, Copy)]
pub struct Receiver {
    pub lat: f64,
    pub lon: f64,
}

/// A position report paired with its computed distance to the receiver.
///
/// Transient output of the selector; a derived [`Sighting`] is what gets
/// persisted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub report: PositionReport,
    /// Great-circle distance to the receiver in km. Always finite.
    pub distance_km: f64,
}

/// Append-only log row, written once per cycle when a candidate exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    pub ident: Option<String>,
    pub hex: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: Option<i64>,
    pub distance_km: f64,
    pub rssi: Option<f64>,
    pub seen_seconds: Option<f64>,
    /// Epoch seconds.
    pub ts: i64,
}

/// Cached route/seat metadata for a flight ident.
///
/// All metadata fields are independently nullable. A row with every
/// metadata field null is a "stub": it marks the ident as considered
/// until a future enrichment call populates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightCacheEntry {
    pub ident: String,
    pub origin_code: Option<String>,
    pub origin_name: Option<String>,
    pub destination_code: Option<String>,
    pub destination_name: Option<String>,
    pub aircraft_type: Option<String>,
    pub seats_first: Option<i64>,
    pub seats_business: Option<i64>,
    pub seats_coach: Option<i64>,
    /// Epoch seconds.
    pub last_updated: i64,
}

impl FlightCacheEntry {
    /// An all-null stub row for an ident with no metadata yet.
    pub fn stub(ident: &str, now: i64) -> Self {
        Self {
            ident: ident.to_string(),
            origin_code: None,
            origin_name: None,
            destination_code: None,
            destination_name: None,
            aircraft_type: None,
            seats_first: None,
            seats_business: None,
            seats_coach: None,
            last_updated: now,
        }
    }

    /// Sum of the seat-class counts, or `None` when all three are absent.
    ///
    /// A present zero counts toward the sum: "known zero" is distinct
    /// from "unknown".
    pub fn seats_total(&self) -> Option<i64> {
        if self.seats_first.is_none() && self.seats_business.is_none() && self.seats_coach.is_none()
        {
            return None;
        }
        Some(
            self.seats_first.unwrap_or(0)
                + self.seats_business.unwrap_or(0)
                + self.seats_coach.unwrap_or(0),
        )
    }
}

/// Negative-cache row recording the last failed resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct MissedIdent {
    pub ident: String,
    /// Epoch seconds.
    pub last_attempted: i64,
}

impl MissedIdent {
    /// Whether this miss still suppresses re-resolution.
    ///
    /// Staleness is a read-time predicate: stale rows stay in the table
    /// and simply stop counting.
    pub fn is_fresh(&self, now: i64, negative_ttl_secs: i64) -> bool {
        now - self.last_attempted < negative_ttl_secs
    }
}

/// Total-seats field of the display payload: a count when any seat-class
/// figure is known, otherwise the `"###"` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeatsTotal {
    Count(i64),
    Unknown(&'static str),
}

/// Outbound payload for the display endpoint.
///
/// Serialized as-is into the PUT body; see the sink adapter for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayPayload {
    pub ident: String,
    pub origin: String,
    pub destination: String,
    pub seats_total: SeatsTotal,
    pub aircraft_type: Option<String>,
    pub distance_km: f64,
    pub alt_ft: Option<i64>,
    /// RFC 3339 UTC timestamp of assembly.
    pub ts: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_ident_trims() {
        let r = PositionReport {
            flight: Some("ASA123  ".to_string()),
            ..Default::default()
        };
        assert_eq!(r.normalized_ident().as_deref(), Some("ASA123"));
    }

    #[test]
    fn test_normalized_ident_blank_is_none() {
        let r = PositionReport {
            flight: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(r.normalized_ident(), None);

        let r = PositionReport::default();
        assert_eq!(r.normalized_ident(), None);
    }

    #[test]
    fn test_seats_total_sums_present_classes() {
        let mut entry = FlightCacheEntry::stub("ASA123", 0);
        entry.seats_first = Some(12);
        entry.seats_business = Some(24);
        entry.seats_coach = Some(120);
        assert_eq!(entry.seats_total(), Some(156));
    }

    #[test]
    fn test_seats_total_all_absent_is_none() {
        let entry = FlightCacheEntry::stub("ASA123", 0);
        assert_eq!(entry.seats_total(), None);
    }

    #[test]
    fn test_seats_total_known_zero_is_zero() {
        let mut entry = FlightCacheEntry::stub("ASA123", 0);
        entry.seats_first = Some(0);
        assert_eq!(entry.seats_total(), Some(0));
    }

    #[test]
    fn test_miss_freshness_window() {
        let miss = MissedIdent {
            ident: "ASA123".to_string(),
            last_attempted: 1_000,
        };
        let ttl = 24 * 3600;
        assert!(miss.is_fresh(1_000 + ttl - 1, ttl));
        assert!(!miss.is_fresh(1_000 + ttl, ttl));
    }
}
