//! User-visible health warning aggregation.
//!
//! The sole gate between "a health state exists" and "the user is told
//! about it": a verdict must ask to warn AND carry confidence at or above
//! the configured floor.

use serde::{Deserialize, Serialize};

use super::confidence::{classify_body_battery, classify_sleep, ConfidenceVerdict, Severity};
use super::trend::analyze_sleep_trend;
use super::{HealthSnapshot, HealthThresholds};

/// What a warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Sleep,
    Conservation,
    Energy,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Conservation => "conservation",
            Self::Energy => "energy",
        }
    }
}

/// A warning that cleared the confidence gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    pub severity: Severity,
    pub confidence: u8,
}

fn gated(verdict: &ConfidenceVerdict, kind: WarningKind, floor: u8) -> Option<HealthWarning> {
    if !verdict.show_warning || verdict.confidence < floor {
        return None;
    }
    Some(HealthWarning {
        kind,
        message: verdict.message.clone().unwrap_or_default(),
        severity: verdict.severity.unwrap_or(Severity::Medium),
        confidence: verdict.confidence,
    })
}

/// Collect every warning today's snapshot and the recent history justify.
pub fn generate_health_warnings(
    today: Option<&HealthSnapshot>,
    history: &[HealthSnapshot],
    thresholds: &HealthThresholds,
) -> Vec<HealthWarning> {
    let floor = thresholds.warning_confidence_floor;
    let mut warnings = Vec::new();

    let sleep = classify_sleep(today, thresholds);
    if let Some(warning) = gated(&sleep, WarningKind::Sleep, floor) {
        warnings.push(warning);
    }

    if history.len() >= 3 {
        let trend = analyze_sleep_trend(history, thresholds);
        if trend.conservation_mode && trend.confidence >= floor {
            warnings.push(HealthWarning {
                kind: WarningKind::Conservation,
                message: trend.message.unwrap_or_default(),
                severity: Severity::High,
                confidence: trend.confidence,
            });
        }
    }

    let battery = classify_body_battery(today, thresholds);
    if let Some(warning) = gated(&battery, WarningKind::Energy, floor) {
        warnings.push(warning);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn thresholds() -> HealthThresholds {
        HealthThresholds::default()
    }

    #[test]
    fn no_data_produces_no_warnings() {
        let warnings = generate_health_warnings(None, &[], &thresholds());
        assert!(warnings.is_empty());
    }

    #[test]
    fn bad_sleep_and_low_battery_both_warn() {
        let snap = HealthSnapshot::new(day(28))
            .with_sleep_hours(4.0)
            .with_body_battery(20);
        let warnings = generate_health_warnings(Some(&snap), &[], &thresholds());
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].kind, WarningKind::Sleep);
        assert_eq!(warnings[1].kind, WarningKind::Energy);
        assert!(warnings.iter().all(|w| w.confidence >= 75));
    }

    #[test]
    fn conservation_trend_adds_high_severity_warning() {
        let history: Vec<_> = (0..3)
            .map(|i| HealthSnapshot::new(day(28 - i)).with_sleep_hours(4.5))
            .collect();
        let today = HealthSnapshot::new(day(28)).with_sleep_hours(7.5);
        let warnings = generate_health_warnings(Some(&today), &history, &thresholds());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Conservation);
        assert_eq!(warnings[0].severity, Severity::High);
    }

    #[test]
    fn out_of_range_battery_stays_silent() {
        let snap = HealthSnapshot::new(day(28))
            .with_sleep_hours(7.5)
            .with_body_battery(300);
        let warnings = generate_health_warnings(Some(&snap), &[], &thresholds());
        assert!(warnings.is_empty());
    }
}
