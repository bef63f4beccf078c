//! Recommendation normalization
//!
//! Fills in the bookkeeping fields a recommendation needs before it is stored.
//! Present values are never overwritten, so normalizing twice is a no-op.

use crate::models::Recommendation;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Confidence assigned when the producer did not supply one
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Identity of one analysis run, shared by every recommendation it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
}

impl RunStamp {
    /// Stamp for a run starting now; ids are unique within the process
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        let seq = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self {
            run_id: format!("{}-{}", timestamp.format("%Y%m%d%H%M%S"), seq),
            timestamp,
        }
    }
}

/// Assign missing `id`, `timestamp` and `confidence_score` fields
pub fn normalize(mut recommendations: Vec<Recommendation>, stamp: &RunStamp) -> Vec<Recommendation> {
    let mut used: HashSet<String> = recommendations
        .iter()
        .filter_map(|r| r.id.clone())
        .collect();
    let timestamp = stamp.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut next = 0usize;

    for rec in recommendations.iter_mut() {
        if rec.id.is_none() {
            let id = loop {
                let candidate = format!("rec_{}_{}", stamp.run_id, next);
                next += 1;
                if !used.contains(&candidate) {
                    break candidate;
                }
            };
            used.insert(id.clone());
            rec.id = Some(id);
        }
        if rec.timestamp.is_none() {
            rec.timestamp = Some(timestamp.clone());
        }
        if rec.confidence_score.is_none() {
            rec.confidence_score = Some(DEFAULT_CONFIDENCE);
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecommendationType, Severity};
    use chrono::TimeZone;

    fn rec(title: &str) -> Recommendation {
        Recommendation::new(RecommendationType::CostLeak, Severity::High, title, "d")
    }

    fn stamp() -> RunStamp {
        RunStamp {
            run_id: "run1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_fills_missing_fields() {
        let out = normalize(vec![rec("a"), rec("b")], &stamp());

        assert_eq!(out[0].id.as_deref(), Some("rec_run1_0"));
        assert_eq!(out[1].id.as_deref(), Some("rec_run1_1"));
        assert_eq!(out[0].timestamp.as_deref(), Some("2024-05-01T12:00:00Z"));
        assert_eq!(out[1].confidence_score, Some(DEFAULT_CONFIDENCE));
    }

    #[test]
    fn test_preserves_present_fields() {
        let mut given = rec("a");
        given.id = Some("custom".to_string());
        given.timestamp = Some("2023-01-01T00:00:00Z".to_string());
        given.confidence_score = Some(0.95);

        let out = normalize(vec![given.clone()], &stamp());

        assert_eq!(out, vec![given]);
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let mut taken = rec("a");
        taken.id = Some("rec_run1_0".to_string());

        let out = normalize(vec![taken, rec("b")], &stamp());

        assert_eq!(out[0].id.as_deref(), Some("rec_run1_0"));
        assert_eq!(out[1].id.as_deref(), Some("rec_run1_1"));
    }

    #[test]
    fn test_idempotent() {
        let once = normalize(vec![rec("a"), rec("b"), rec("c")], &stamp());
        let twice = normalize(once.clone(), &stamp());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_run_ids_unique() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let a = RunStamp::at(ts);
        let b = RunStamp::at(ts);

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.timestamp, b.timestamp);
    }
}
