//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Every rendered number comes from `compute_health_at` / `build_risk_matrix`;
//!   renderers never re-derive a score

use crate::adoption::AdoptionSummary;
use crate::health::HealthMetrics;
use crate::matrix::{build_risk_matrix, ImpactBand, ProbabilityBand, RiskMatrix};
use crate::snapshot::Program;
use serde::Serialize;

/// Health and risk picture for one program
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramReport {
    pub program_id: String,
    pub program_name: String,
    pub health: HealthMetrics,
    pub risk_matrix: RiskMatrix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adoption: Option<AdoptionSummary>,
}

/// Sort reports deterministically
pub fn sort_reports(mut reports: Vec<ProgramReport>) -> Vec<ProgramReport> {
    reports.sort_by(|a, b| {
        // 1. Score ascending (worst first)
        a.health
            .score
            .cmp(&b.health.score)
            // 2. Program id ascending
            .then_with(|| a.program_id.cmp(&b.program_id))
            // 3. Name ascending
            .then_with(|| a.program_name.cmp(&b.program_name))
    });
    reports
}

/// Render reports as a text table
pub fn render_text(reports: &[ProgramReport]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<6} {:<10} {:<5} {:<8} {:<8} {:<8} {}\n",
        "SCORE", "STATUS", "CRIT", "OVERDUE", "BLOCKED", "MISSING", "PROGRAM"
    ));

    for report in reports {
        let b = &report.health.breakdown;
        output.push_str(&format!(
            "{:<6} {:<10} {:<5} {:<8} {:<8} {:<8} {}\n",
            report.health.score,
            report.health.status.label(),
            b.critical_risks,
            b.overdue_milestones,
            b.blocked_dependencies,
            b.missing_components,
            truncate_or_pad(&report.program_name, 40).trim_end(),
        ));
    }

    output
}

/// Render reports as JSON output
pub fn render_json(reports: &[ProgramReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// One entry of `render_matrix_json` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatrixEntry<'a> {
    program_id: &'a str,
    program_name: &'a str,
    risk_matrix: RiskMatrix,
}

/// Render risk matrices as a JSON array, one entry per program in input order.
///
/// Programs are never keyed by id, so duplicate or missing ids keep their own entry.
pub fn render_matrix_json(programs: &[&Program]) -> String {
    let entries: Vec<MatrixEntry<'_>> = programs
        .iter()
        .map(|program| MatrixEntry {
            program_id: &program.id,
            program_name: program.display_name(),
            risk_matrix: build_risk_matrix(&program.risks),
        })
        .collect();
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

/// Render a heatmap grid, highest probability first
pub fn render_matrix_text(matrix: &RiskMatrix) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<18}", "PROBABILITY\\IMPACT"));
    for impact in ImpactBand::ALL {
        output.push_str(&format!(" {:<14}", impact.as_str()));
    }
    output.push('\n');

    for probability in ProbabilityBand::ALL.iter().rev() {
        output.push_str(&format!("{:<18}", probability.as_str()));
        for impact in ImpactBand::ALL {
            let cell = format!(
                "{} ({})",
                matrix.count(*probability, impact),
                matrix.tint(*probability, impact).as_str()
            );
            output.push_str(&format!(" {:<14}", cell));
        }
        output.push('\n');
    }

    output.push_str(&format!("total: {}\n", matrix.total()));
    output
}

/// Plain-language summary of one program, for generated status reports
pub fn render_summary(report: &ProgramReport) -> String {
    let health = &report.health;
    let b = &health.breakdown;

    let mut issues = Vec::new();
    if b.critical_risks > 0 {
        issues.push(plural(b.critical_risks, "high or critical risk", "high or critical risks"));
    }
    if b.overdue_milestones > 0 {
        issues.push(plural(b.overdue_milestones, "overdue milestone", "overdue milestones"));
    }
    if b.blocked_dependencies > 0 {
        issues.push(plural(b.blocked_dependencies, "blocked dependency", "blocked dependencies"));
    }
    if b.missing_components > 0 {
        issues.push(plural(
            b.missing_components as usize,
            "missing component",
            "missing components",
        ));
    }

    let mut text = format!(
        "{} is {} with a health score of {}/100.",
        report.program_name,
        health.status.label(),
        health.score
    );

    if issues.is_empty() {
        text.push_str(" No open issues are reducing the score.");
    } else {
        text.push_str(&format!(" Contributing issues: {}.", join_list(&issues)));
    }

    let total = report.risk_matrix.total();
    if let Some((probability, impact, count)) = report.risk_matrix.hottest_cell() {
        text.push_str(&format!(
            " {} tracked; the largest cluster is {} probability / {} impact ({}).",
            plural(total, "risk is", "risks are"),
            probability.as_str(),
            impact.as_str(),
            count
        ));
    }

    if let Some(adoption) = &report.adoption {
        text.push_str(&format!(
            " {} of {} adopters are ready or completed",
            adoption.ready + adoption.completed,
            adoption.total
        ));
        match adoption.average_readiness {
            Some(avg) => text.push_str(&format!(", average readiness {}%.", avg)),
            None => text.push('.'),
        }
    }

    text
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
