//! Property tests for the confidence layer and the load-score clamp.

use chrono::{NaiveDate, TimeZone, Utc};
use daybrief_core::{
    classify_sleep, generate_daily_brief, BriefConfig, BriefInputs, ConfidenceState, Domain,
    HealthSnapshot, HealthThresholds, PlanItem, Severity,
};
use proptest::prelude::*;

fn snapshot(sleep_hours: f64) -> HealthSnapshot {
    HealthSnapshot::new(NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()).with_sleep_hours(sleep_hours)
}

fn thresholds() -> HealthThresholds {
    HealthThresholds::default()
}

proptest! {
    #[test]
    fn sub_hour_readings_are_always_missing_data(hours in 0.0f64..1.0) {
        let verdict = classify_sleep(Some(&snapshot(hours)), &thresholds());
        prop_assert_eq!(verdict.state, ConfidenceState::MissingData);
        prop_assert!(!verdict.show_warning);
    }

    #[test]
    fn five_to_six_hours_is_a_low_severity_signal(hours in 5.0f64..6.0) {
        let verdict = classify_sleep(Some(&snapshot(hours)), &thresholds());
        prop_assert_eq!(verdict.state, ConfidenceState::NegativeSignal);
        prop_assert_eq!(verdict.severity, Some(Severity::Low));
        prop_assert!(verdict.show_warning);
    }

    #[test]
    fn six_hours_or_more_is_high_and_silent(hours in 6.0f64..14.0) {
        let verdict = classify_sleep(Some(&snapshot(hours)), &thresholds());
        prop_assert_eq!(verdict.state, ConfidenceState::High);
        prop_assert!(!verdict.show_warning);
    }

    #[test]
    fn warnings_only_surface_at_high_confidence(hours in 0.0f64..20.0) {
        let verdict = classify_sleep(Some(&snapshot(hours)), &thresholds());
        if verdict.show_warning {
            prop_assert!(verdict.confidence >= 75);
            prop_assert_eq!(verdict.state, ConfidenceState::NegativeSignal);
        }
    }

    #[test]
    fn load_score_is_always_in_bounds(loads in prop::collection::vec(1u32..120, 0..12)) {
        let now = Utc.with_ymd_and_hms(2026, 1, 28, 9, 0, 0).unwrap();
        let items: Vec<PlanItem> = loads
            .iter()
            .enumerate()
            .map(|(i, load)| {
                PlanItem::new(format!("t{i}"), format!("Task {i}"), now)
                    .with_domain(if i % 3 == 0 { Domain::Family } else { Domain::Work })
                    .with_load(*load)
            })
            .collect();
        let brief = generate_daily_brief(
            &BriefInputs {
                items: &items,
                health_today: None,
                health_history: &[],
                now,
            },
            &thresholds(),
            &BriefConfig::default(),
        );
        prop_assert!(brief.load_score <= 100);
        prop_assert_eq!(
            brief.doing_today_structured.len() + brief.not_doing_today_structured.len(),
            items.len()
        );
    }
}
