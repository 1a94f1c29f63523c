//! Property tests for the health scorer and risk matrix builder

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use pulse_core::entity::parse_due_date;
use pulse_core::health::score_for;
use pulse_core::{
    badge_for, build_risk_matrix, compute_health_at, progress_color_for, Dependency,
    HealthBreakdown, Milestone, ProbabilityBand, Risk,
};

fn reference_now() -> DateTime<Utc> {
    parse_due_date("2024-06-01T12:00:00Z").unwrap()
}

fn arb_severity() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("low".to_string())),
        Just(Some("medium".to_string())),
        Just(Some("high".to_string())),
        Just(Some("critical".to_string())),
        Just(Some("HIGH".to_string())),
    ]
}

fn arb_likelihood() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        (-2i32..8).prop_map(|n| Some(f64::from(n))),
        (-2.0f64..8.0).prop_map(Some),
    ]
}

fn arb_risk() -> impl Strategy<Value = Risk> {
    (arb_severity(), arb_likelihood(), arb_likelihood()).prop_map(|(severity, probability, impact)| {
        Risk {
            severity,
            probability,
            impact,
            ..Risk::default()
        }
    })
}

fn arb_milestone() -> impl Strategy<Value = Milestone> {
    let due = prop_oneof![
        Just(None),
        Just(Some("2020-01-01")),
        Just(Some("2024-06-01")),
        Just(Some("2024-06-01T12:00:00Z")),
        Just(Some("2030-12-31")),
        Just(Some("whenever")),
    ];
    let status = prop_oneof![
        Just(None),
        Just(Some("completed")),
        Just(Some("in_progress")),
        Just(Some("at_risk")),
        Just(Some("delayed")),
    ];
    (due, status).prop_map(|(due, status)| Milestone::new(due, status))
}

fn arb_dependency() -> impl Strategy<Value = Dependency> {
    prop_oneof![
        Just(Dependency::default()),
        Just(Dependency::with_status("blocked")),
        Just(Dependency::with_status("at_risk")),
        Just(Dependency::with_status("on_track")),
        Just(Dependency::with_status("completed")),
    ]
}

/// Find a breakdown whose unclamped deductions equal `100 - score` exactly
fn engineered_breakdown(score: u8) -> Option<HealthBreakdown> {
    let target = 100 - i64::from(score);
    for critical in 0..=7i64 {
        for overdue in 0..=9i64 {
            for blocked in 0..=13i64 {
                let rest = target - critical * 15 - overdue * 12 - blocked * 8;
                if rest >= 0 && rest % 5 == 0 {
                    return Some(HealthBreakdown {
                        critical_risks: critical as usize,
                        overdue_milestones: overdue as usize,
                        blocked_dependencies: blocked as usize,
                        missing_components: (rest / 5) as u32,
                    });
                }
            }
        }
    }
    None
}

proptest! {
    #[test]
    fn score_is_always_within_bounds(
        risks in prop::collection::vec(arb_risk(), 0..40),
        milestones in prop::collection::vec(arb_milestone(), 0..20),
        dependencies in prop::collection::vec(arb_dependency(), 0..20),
        missing in prop::option::of(0u32..50),
    ) {
        let health = compute_health_at(&risks, &milestones, &dependencies, missing, reference_now());
        prop_assert!(health.score <= 100);
        prop_assert_eq!(health.status.label(), badge_for(health.score).label);
        prop_assert_eq!(health.color.as_str(), health.status.color());
    }

    #[test]
    fn adding_issues_never_raises_the_score(
        risks in prop::collection::vec(arb_risk(), 0..20),
        milestones in prop::collection::vec(arb_milestone(), 0..10),
        dependencies in prop::collection::vec(arb_dependency(), 0..10),
        missing in prop::option::of(0u32..10),
    ) {
        let now = reference_now();
        let base = compute_health_at(&risks, &milestones, &dependencies, missing, now).score;

        let mut more_risks = risks.clone();
        more_risks.push(Risk::with_severity("critical"));
        let with_risk = compute_health_at(&more_risks, &milestones, &dependencies, missing, now);
        prop_assert!(with_risk.score <= base);

        let mut more_milestones = milestones.clone();
        more_milestones.push(Milestone::new(Some("2020-01-01"), Some("in_progress")));
        let with_overdue = compute_health_at(&risks, &more_milestones, &dependencies, missing, now);
        prop_assert!(with_overdue.score <= base);

        let mut more_dependencies = dependencies.clone();
        more_dependencies.push(Dependency::with_status("blocked"));
        let with_blocked = compute_health_at(&risks, &milestones, &more_dependencies, missing, now);
        prop_assert!(with_blocked.score <= base);
    }

    #[test]
    fn matrix_conserves_risk_count(risks in prop::collection::vec(arb_risk(), 0..60)) {
        let matrix = build_risk_matrix(&risks);
        prop_assert_eq!(matrix.total(), risks.len());
        prop_assert_eq!(matrix.cells().count(), 12);
    }

    #[test]
    fn null_likelihood_always_lands_in_medium_row(impact in arb_likelihood()) {
        let matrix = build_risk_matrix(&[Risk::with_likelihood(None, impact)]);
        let in_medium_row: usize = matrix
            .cells()
            .filter(|(p, _, _)| *p == ProbabilityBand::Medium)
            .map(|(_, _, c)| c)
            .sum();
        prop_assert_eq!(in_medium_row, 1);
    }
}

#[test]
fn badge_and_status_agree_for_every_reachable_score() {
    let mut reached = 0;
    for score in 0..=100u8 {
        let Some(breakdown) = engineered_breakdown(score) else {
            continue;
        };
        assert_eq!(score_for(&breakdown), score);

        let risks = vec![Risk::with_severity("high"); breakdown.critical_risks];
        let milestones =
            vec![Milestone::new(Some("2020-01-01"), Some("delayed")); breakdown.overdue_milestones];
        let dependencies = vec![Dependency::with_status("blocked"); breakdown.blocked_dependencies];
        let health = compute_health_at(
            &risks,
            &milestones,
            &dependencies,
            Some(breakdown.missing_components),
            reference_now(),
        );

        assert_eq!(health.score, score);
        assert_eq!(health.breakdown, breakdown);
        assert_eq!(badge_for(score).label, health.status.label(), "score {}", score);
        assert_eq!(progress_color_for(score), health.status.progress_color());
        reached += 1;
    }
    // A few scores above 80 (99, 98, 97, 96, 94, ...) cannot be hit with 15/12/8/5 steps
    assert!(reached >= 90, "only {} scores reachable", reached);
    for boundary in [0u8, 39, 40, 59, 60, 79, 80, 100] {
        assert!(engineered_breakdown(boundary).is_some(), "boundary {}", boundary);
    }
}
