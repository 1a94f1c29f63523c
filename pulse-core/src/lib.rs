//! Pulse core library - program health scoring and risk matrices

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Health and matrix computations are pure functions of the supplied entities
// - No global mutable state
// - The reference clock is always an explicit argument below the top-level helpers
// - One scoring formula; no surface recomputes health on its own
// - Identical input yields byte-for-byte identical output

pub mod adoption;
pub mod classify;
pub mod config;
pub mod entity;
pub mod health;
pub mod matrix;
pub mod report;
pub mod snapshot;

pub use classify::{badge_for, progress_color_for, status_for_score, Badge, HealthStatus};
pub use config::ResolvedConfig;
pub use entity::{Adopter, Dependency, Milestone, Risk};
pub use health::{compute_health, compute_health_at, HealthBreakdown, HealthMetrics};
pub use matrix::{build_risk_matrix, cell_tint, CellTint, ImpactBand, ProbabilityBand, RiskMatrix};
pub use report::{render_json, render_matrix_json, render_text, sort_reports, ProgramReport};
pub use snapshot::{load_snapshot, Program, ProgramSnapshot};

use chrono::{DateTime, Utc};

/// Score filter and result limit applied after evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluateOptions {
    pub max_score: Option<u8>,
    pub top_n: Option<usize>,
}

/// Evaluate every program in a snapshot with default configuration
pub fn evaluate(
    snapshot: &ProgramSnapshot,
    now: DateTime<Utc>,
    options: EvaluateOptions,
) -> Vec<ProgramReport> {
    evaluate_with_config(snapshot, now, options, None)
}

/// Evaluate programs, applying include/exclude from an optional resolved configuration
pub fn evaluate_with_config(
    snapshot: &ProgramSnapshot,
    now: DateTime<Utc>,
    options: EvaluateOptions,
    resolved_config: Option<&ResolvedConfig>,
) -> Vec<ProgramReport> {
    let reports: Vec<ProgramReport> = snapshot
        .programs
        .iter()
        .filter(|program| match resolved_config {
            Some(config) => config.should_include(&program.id),
            None => true,
        })
        .map(|program| program.evaluate(now))
        .filter(|report| !matches!(options.max_score, Some(max) if report.health.score > max))
        .collect();

    // Sort deterministically
    let sorted_reports = sort_reports(reports);

    if let Some(top_n) = options.top_n {
        sorted_reports.into_iter().take(top_n).collect()
    } else {
        sorted_reports
    }
}
