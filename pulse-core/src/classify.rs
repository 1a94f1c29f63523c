//! Score and severity classification
//!
//! Global invariants enforced:
//! - Status text, badge styling and progress color share one threshold function
//! - Classification depends on the score alone, never on entities

use crate::entity::DEFAULT_SEVERITY;
use serde::{Deserialize, Serialize};

/// Inclusive lower bound for "Excellent"
pub const EXCELLENT_THRESHOLD: u8 = 80;
/// Inclusive lower bound for "Good"
pub const GOOD_THRESHOLD: u8 = 60;
/// Inclusive lower bound for "Fair"
pub const FAIR_THRESHOLD: u8 = 40;

/// Health status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent, // >= 80
    Good,      // 60-79
    Fair,      // 40-59
    #[serde(rename = "At Risk")]
    AtRisk, // < 40
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::AtRisk => "At Risk",
        }
    }

    /// Text color token for the score
    pub fn color(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "text-green-600",
            HealthStatus::Good => "text-blue-600",
            HealthStatus::Fair => "text-yellow-600",
            HealthStatus::AtRisk => "text-red-600",
        }
    }

    /// Badge background/foreground classes
    pub fn badge_class(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "bg-green-100 text-green-800",
            HealthStatus::Good => "bg-blue-100 text-blue-800",
            HealthStatus::Fair => "bg-yellow-100 text-yellow-800",
            HealthStatus::AtRisk => "bg-red-100 text-red-800",
        }
    }

    /// Progress bar fill token
    pub fn progress_color(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "bg-green-500",
            HealthStatus::Good => "bg-blue-500",
            HealthStatus::Fair => "bg-yellow-500",
            HealthStatus::AtRisk => "bg-red-500",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Assign a health status to a score.
///
/// Bands are inclusive lower bounds evaluated top-down; the first match wins.
pub fn status_for_score(score: u8) -> HealthStatus {
    if score >= EXCELLENT_THRESHOLD {
        HealthStatus::Excellent
    } else if score >= GOOD_THRESHOLD {
        HealthStatus::Good
    } else if score >= FAIR_THRESHOLD {
        HealthStatus::Fair
    } else {
        HealthStatus::AtRisk
    }
}

/// Badge shown on list cards and detail headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub label: &'static str,
    pub color_class: &'static str,
}

pub fn badge_for(score: u8) -> Badge {
    let status = status_for_score(score);
    Badge {
        label: status.label(),
        color_class: status.badge_class(),
    }
}

pub fn progress_color_for(score: u8) -> &'static str {
    status_for_score(score).progress_color()
}

/// Badge classes for a risk's severity string.
///
/// Absent severities and values outside the known set take the "medium" default.
pub fn severity_badge(severity: Option<&str>) -> &'static str {
    match severity.unwrap_or(DEFAULT_SEVERITY) {
        "critical" => "bg-red-100 text-red-800",
        "high" => "bg-orange-100 text-orange-800",
        "low" => "bg-green-100 text-green-800",
        _ => "bg-yellow-100 text-yellow-800",
    }
}
