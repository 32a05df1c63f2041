//! Closest-candidate selection.
//!
//! Filters a batch of position reports by freshness and accuracy, then
//! picks the minimum-distance survivor with a freshness tie-break. Pure
//! and deterministic: no I/O, no hidden state.

use crate::geo::haversine_km;
use crate::models::{Candidate, PositionReport, Receiver};

/// Distances closer together than this are considered a tie and resolved
/// by freshness instead.
pub const DISTANCE_TIE_KM: f64 = 0.1;

/// Gating thresholds applied to each report before it can compete.
#[derive(Debug, Clone, Copy)]
pub struct SelectorPolicy {
    /// Maximum position-fix age in seconds.
    pub max_age_seconds: f64,
    /// Minimum accuracy category (`nac_p`) when the report carries one.
    /// Reports without an accuracy figure pass this gate.
    pub min_accuracy: u32,
}

impl Default for SelectorPolicy {
    fn default() -> Self {
        Self {
            max_age_seconds: 10.0,
            min_accuracy: 5,
        }
    }
}

/// Whether a report is eligible to compete at all.
fn passes_gates(report: &PositionReport, policy: &SelectorPolicy) -> bool {
    let (Some(lat), Some(lon)) = (report.lat, report.lon) else {
        return false;
    };
    if !lat.is_finite() || !lon.is_finite() {
        return false;
    }

    let Some(age) = report.age_seconds else {
        return false;
    };
    if !age.is_finite() || age > policy.max_age_seconds {
        return false;
    }

    if let Some(accuracy) = report.accuracy {
        if accuracy < policy.min_accuracy {
            return false;
        }
    }

    true
}

/// Pick the report closest to the receiver, or `None` when nothing survives
/// the gates.
///
/// Pairwise selection rule against the running best:
/// - a non-finite computed distance disqualifies the report outright;
/// - strictly smaller distance wins;
/// - within [`DISTANCE_TIE_KM`] of the best, the smaller position age wins
///   even when the distance is not strictly smaller.
///
/// The tie-break makes the result independent of batch order for
/// effectively-equidistant aircraft.
pub fn select_closest(
    reports: &[PositionReport],
    receiver: &Receiver,
    policy: &SelectorPolicy,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for report in reports.iter().filter(|r| passes_gates(r, policy)) {
        // Gates guarantee coordinates are present and finite.
        let (Some(lat), Some(lon)) = (report.lat, report.lon) else {
            continue;
        };
        let distance_km = haversine_km(receiver.lat, receiver.lon, lat, lon);
        if !distance_km.is_finite() {
            continue;
        }

        match &best {
            None => {
                best = Some(Candidate {
                    report: report.clone(),
                    distance_km,
                });
            }
            Some(current) => {
                let replace = if (distance_km - current.distance_km).abs() < DISTANCE_TIE_KM {
                    let new_age = report.age_seconds.unwrap_or(f64::INFINITY);
                    let best_age = current.report.age_seconds.unwrap_or(f64::INFINITY);
                    new_age < best_age
                } else {
                    distance_km < current.distance_km
                };
                if replace {
                    best = Some(Candidate {
                        report: report.clone(),
                        distance_km,
                    });
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEATTLE: Receiver = Receiver {
        lat: 47.60,
        lon: -122.33,
    };

    fn report(hex: &str, lat: f64, lon: f64, age: f64) -> PositionReport {
        PositionReport {
            hex: Some(hex.to_string()),
            lat: Some(lat),
            lon: Some(lon),
            age_seconds: Some(age),
            ..Default::default()
        }
    }

    #[test]
    fn test_closer_report_wins() {
        let a = report("a1b2c3", 47.61, -122.30, 5.0);
        let b = report("d4e5f6", 47.70, -122.40, 5.0);
        let policy = SelectorPolicy::default();

        let best = select_closest(&[a, b], &SEATTLE, &policy).unwrap();
        assert_eq!(best.report.hex.as_deref(), Some("a1b2c3"));
    }

    #[test]
    fn test_tie_break_prefers_fresher_fix() {
        // Distances differ by well under 0.1 km; B has the newer fix.
        let a = report("a1b2c3", 47.61, -122.30, 5.0);
        let b = report("d4e5f6", 47.611, -122.301, 1.0);
        let policy = SelectorPolicy::default();

        let best = select_closest(&[a.clone(), b.clone()], &SEATTLE, &policy).unwrap();
        assert_eq!(best.report.hex.as_deref(), Some("d4e5f6"));

        // Same winner regardless of batch order.
        let best = select_closest(&[b, a], &SEATTLE, &policy).unwrap();
        assert_eq!(best.report.hex.as_deref(), Some("d4e5f6"));
    }

    #[test]
    fn test_tie_break_does_not_apply_outside_tolerance() {
        // B is fresher but clearly farther; distance must win.
        let a = report("a1b2c3", 47.61, -122.30, 5.0);
        let b = report("d4e5f6", 47.70, -122.40, 1.0);
        let policy = SelectorPolicy::default();

        let best = select_closest(&[a, b], &SEATTLE, &policy).unwrap();
        assert_eq!(best.report.hex.as_deref(), Some("a1b2c3"));
    }

    #[test]
    fn test_stale_report_never_selected() {
        let mut only = report("a1b2c3", 47.61, -122.30, 45.0);
        only.flight = Some("ASA123".to_string());
        let policy = SelectorPolicy {
            max_age_seconds: 30.0,
            min_accuracy: 0,
        };

        assert!(select_closest(&[only], &SEATTLE, &policy).is_none());
    }

    #[test]
    fn test_missing_coordinates_never_selected() {
        let only = PositionReport {
            hex: Some("a1b2c3".to_string()),
            age_seconds: Some(1.0),
            ..Default::default()
        };

        let policy = SelectorPolicy::default();
        assert!(select_closest(&[only], &SEATTLE, &policy).is_none());
    }

    #[test]
    fn test_non_finite_coordinates_never_selected() {
        let only = report("a1b2c3", f64::NAN, -122.30, 1.0);
        let policy = SelectorPolicy::default();
        assert!(select_closest(&[only], &SEATTLE, &policy).is_none());
    }

    #[test]
    fn test_missing_age_never_selected() {
        let mut only = report("a1b2c3", 47.61, -122.30, 1.0);
        only.age_seconds = None;
        let policy = SelectorPolicy::default();
        assert!(select_closest(&[only], &SEATTLE, &policy).is_none());
    }

    #[test]
    fn test_accuracy_gate() {
        let mut low = report("a1b2c3", 47.61, -122.30, 1.0);
        low.accuracy = Some(3);
        let mut ok = report("d4e5f6", 47.70, -122.40, 1.0);
        ok.accuracy = Some(8);
        let policy = SelectorPolicy {
            max_age_seconds: 10.0,
            min_accuracy: 5,
        };

        // The closer report fails the accuracy gate, so the farther one wins.
        let best = select_closest(&[low, ok], &SEATTLE, &policy).unwrap();
        assert_eq!(best.report.hex.as_deref(), Some("d4e5f6"));
    }

    #[test]
    fn test_absent_accuracy_passes_gate() {
        let only = report("a1b2c3", 47.61, -122.30, 1.0);
        let policy = SelectorPolicy {
            max_age_seconds: 10.0,
            min_accuracy: 9,
        };

        assert!(select_closest(&[only], &SEATTLE, &policy).is_some());
    }

    #[test]
    fn test_empty_batch_yields_none() {
        let policy = SelectorPolicy::default();
        assert!(select_closest(&[], &SEATTLE, &policy).is_none());
    }

    #[test]
    fn test_winner_satisfies_gates() {
        let policy = SelectorPolicy {
            max_age_seconds: 10.0,
            min_accuracy: 5,
        };
        let mut inaccurate = report("000001", 47.601, -122.331, 1.0);
        inaccurate.accuracy = Some(1);
        let stale = report("000002", 47.601, -122.331, 60.0);
        let good = report("000003", 47.65, -122.35, 4.0);

        let best = select_closest(&[inaccurate, stale, good], &SEATTLE, &policy).unwrap();
        assert_eq!(best.report.hex.as_deref(), Some("000003"));
        assert!(best.report.age_seconds.unwrap() <= policy.max_age_seconds);
        assert!(best.distance_km.is_finite() && best.distance_km >= 0.0);
    }
}
