//! Program health score
//!
//! Reduces a program's risks, milestones and dependencies to a 0-100 score.
//!
//! Global invariants enforced:
//! - Score is clamped to [0, 100]
//! - Status and color are derived from the final score only
//! - Breakdown counts are reported unclamped
//! - The clock is an explicit input (`compute_health_at`)

use crate::classify::{status_for_score, HealthStatus};
use crate::entity::{Dependency, Milestone, Risk};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deduction per high/critical risk
pub const CRITICAL_RISK_WEIGHT: i64 = 15;
/// Deduction per overdue milestone
pub const OVERDUE_MILESTONE_WEIGHT: i64 = 12;
/// Deduction per blocked dependency
pub const BLOCKED_DEPENDENCY_WEIGHT: i64 = 8;
/// Deduction per missing component
pub const MISSING_COMPONENT_WEIGHT: i64 = 5;

const MAX_SCORE: i64 = 100;

/// Issue counts behind a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdown {
    pub critical_risks: usize,
    pub overdue_milestones: usize,
    pub blocked_dependencies: usize,
    pub missing_components: u32,
}

/// Computed health of a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub score: u8,
    pub status: HealthStatus,
    pub color: String,
    pub breakdown: HealthBreakdown,
}

impl HealthMetrics {
    fn from_breakdown(breakdown: HealthBreakdown) -> Self {
        let score = score_for(&breakdown);
        let status = status_for_score(score);
        HealthMetrics {
            score,
            status,
            color: status.color().to_string(),
            breakdown,
        }
    }
}

/// Compute program health against the current clock
pub fn compute_health(
    risks: &[Risk],
    milestones: &[Milestone],
    dependencies: &[Dependency],
    missing_components: Option<u32>,
) -> HealthMetrics {
    compute_health_at(risks, milestones, dependencies, missing_components, Utc::now())
}

/// Compute program health with an explicit reference instant
///
/// Deductions, applied in this order from a base of 100:
/// - 15 per risk with severity "high" or "critical"
/// - 12 per overdue milestone
/// - 8 per blocked dependency
/// - 5 per missing component (0 when not supplied)
pub fn compute_health_at(
    risks: &[Risk],
    milestones: &[Milestone],
    dependencies: &[Dependency],
    missing_components: Option<u32>,
    now: DateTime<Utc>,
) -> HealthMetrics {
    let breakdown = HealthBreakdown {
        critical_risks: risks.iter().filter(|r| r.is_critical()).count(),
        overdue_milestones: milestones.iter().filter(|m| m.is_overdue_at(now)).count(),
        blocked_dependencies: dependencies.iter().filter(|d| d.is_blocked()).count(),
        missing_components: missing_components.unwrap_or(0),
    };
    HealthMetrics::from_breakdown(breakdown)
}

/// Score for a breakdown, clamped to [0, 100]
pub fn score_for(breakdown: &HealthBreakdown) -> u8 {
    let deductions = [
        (saturating_count(breakdown.critical_risks), CRITICAL_RISK_WEIGHT),
        (saturating_count(breakdown.overdue_milestones), OVERDUE_MILESTONE_WEIGHT),
        (saturating_count(breakdown.blocked_dependencies), BLOCKED_DEPENDENCY_WEIGHT),
        (i64::from(breakdown.missing_components), MISSING_COMPONENT_WEIGHT),
    ];

    let mut score = MAX_SCORE;
    for (count, weight) in deductions {
        score = score.saturating_sub(count.saturating_mul(weight));
    }

    score.clamp(0, MAX_SCORE) as u8
}

fn saturating_count(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
