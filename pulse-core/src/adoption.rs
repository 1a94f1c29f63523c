//! Adopter readiness rollup
//!
//! Summarizes adopters for detail panels. Never feeds the health score.

use crate::entity::Adopter;
use serde::{Deserialize, Serialize};

/// Adopter counts by status plus mean readiness
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionSummary {
    pub total: usize,
    pub ready: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub completed: usize,
    /// Absent or unrecognized status
    pub other: usize,
    /// Rounded mean of present readiness scores, each clamped to [0, 100]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_readiness: Option<u8>,
}

pub fn summarize_adoption(adopters: &[Adopter]) -> AdoptionSummary {
    let mut summary = AdoptionSummary {
        total: adopters.len(),
        ..AdoptionSummary::default()
    };

    let mut readiness_sum = 0.0;
    let mut readiness_count = 0usize;

    for adopter in adopters {
        match adopter.status.as_deref() {
            Some("ready") => summary.ready += 1,
            Some("in_progress") => summary.in_progress += 1,
            Some("blocked") => summary.blocked += 1,
            Some("completed") => summary.completed += 1,
            _ => summary.other += 1,
        }

        if let Some(score) = adopter.readiness_score.filter(|s| !s.is_nan()) {
            readiness_sum += score.clamp(0.0, 100.0);
            readiness_count += 1;
        }
    }

    if readiness_count > 0 {
        let mean = readiness_sum / readiness_count as f64;
        summary.average_readiness = Some(mean.round() as u8);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adopter(status: Option<&str>, readiness: Option<f64>) -> Adopter {
        Adopter {
            status: status.map(str::to_string),
            readiness_score: readiness,
            ..Adopter::default()
        }
    }

    #[test]
    fn test_empty() {
        let summary = summarize_adoption(&[]);
        assert_eq!(summary, AdoptionSummary::default());
    }

    #[test]
    fn test_counts_by_status() {
        let summary = summarize_adoption(&[
            adopter(Some("ready"), None),
            adopter(Some("in_progress"), None),
            adopter(Some("blocked"), None),
            adopter(Some("completed"), None),
            adopter(Some("paused"), None),
            adopter(None, None),
        ]);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.ready, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.other, 2);
        assert!(summary.average_readiness.is_none());
    }

    #[test]
    fn test_average_readiness_skips_absent_and_clamps() {
        let summary = summarize_adoption(&[
            adopter(None, Some(50.0)),
            adopter(None, Some(150.0)),
            adopter(None, None),
            adopter(None, Some(-20.0)),
        ]);
        // (50 + 100 + 0) / 3 = 50
        assert_eq!(summary.average_readiness, Some(50));
    }

    #[test]
    fn test_average_readiness_rounds() {
        let summary = summarize_adoption(&[adopter(None, Some(70.0)), adopter(None, Some(71.0))]);
        assert_eq!(summary.average_readiness, Some(71));
    }
}
