//! Single-metric confidence classification.
//!
//! Turns one raw reading into a [`ConfidenceVerdict`]. The cardinal rule:
//! a sensor that was not worn is not evidence of poor health. Short or
//! implausible readings are classified as missing/low-confidence, never
//! as a negative signal.

use serde::{Deserialize, Serialize};

use super::{HealthSnapshot, HealthThresholds};

/// Confidence classification of one metric reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceState {
    /// No usable data (device not worn, sync failed).
    MissingData,
    /// Data exists but is incomplete or implausible.
    LowConfidence,
    /// Data is trustworthy and indicates a real issue.
    NegativeSignal,
    /// Data is trustworthy and unremarkable.
    High,
}

impl ConfidenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingData => "missing_data",
            Self::LowConfidence => "low_confidence",
            Self::NegativeSignal => "negative_signal",
            Self::High => "high",
        }
    }

    /// Short display label for renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingData => "no data",
            Self::LowConfidence => "partial data",
            Self::NegativeSignal => "issue detected",
            Self::High => "ok",
        }
    }
}

/// Severity of a surfaced warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Outcome of classifying one metric. Recomputed on every call, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceVerdict {
    pub state: ConfidenceState,
    /// Heuristic confidence in the classification, 0-100.
    pub confidence: u8,
    pub message: Option<String>,
    pub show_warning: bool,
    pub severity: Option<Severity>,
}

impl ConfidenceVerdict {
    fn silent(state: ConfidenceState, confidence: u8, message: Option<String>) -> Self {
        Self {
            state,
            confidence,
            message,
            show_warning: false,
            severity: None,
        }
    }

    fn warning(confidence: u8, message: String, severity: Severity) -> Self {
        Self {
            state: ConfidenceState::NegativeSignal,
            confidence,
            message: Some(message),
            show_warning: true,
            severity: Some(severity),
        }
    }
}

/// Classify one night of sleep.
///
/// `snapshot` is `None` when no reading exists for the day at all.
pub fn classify_sleep(
    snapshot: Option<&HealthSnapshot>,
    thresholds: &HealthThresholds,
) -> ConfidenceVerdict {
    let Some(snapshot) = snapshot else {
        return ConfidenceVerdict::silent(
            ConfidenceState::MissingData,
            0,
            Some("no sleep data".to_string()),
        );
    };

    let Some(hours) = snapshot.sleep_hours else {
        // No sleep recorded. Steps or a battery reading prove the device
        // was worn, which makes this partial data rather than missing.
        let device_worn = snapshot
            .steps
            .map(|s| s > thresholds.steps_min_for_worn)
            .unwrap_or(false)
            || snapshot.body_battery.is_some();

        if !device_worn {
            return ConfidenceVerdict::silent(
                ConfidenceState::MissingData,
                0,
                Some("no sleep measured -- device was likely not worn".to_string()),
            );
        }
        return ConfidenceVerdict::silent(
            ConfidenceState::LowConfidence,
            30,
            Some("partial sleep data".to_string()),
        );
    };

    // A short reading is never treated as "bad sleep".
    if hours < thresholds.sleep_min_hours {
        return ConfidenceVerdict::silent(
            ConfidenceState::MissingData,
            10,
            Some("sleep too short to be real -- device was likely not worn".to_string()),
        );
    }

    if hours > thresholds.sleep_max_hours {
        return ConfidenceVerdict::silent(
            ConfidenceState::LowConfidence,
            20,
            Some("implausible sleep reading -- check device sync".to_string()),
        );
    }

    if hours < thresholds.short_night_hours {
        let severity = if hours < thresholds.short_night_hours - 1.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        return ConfidenceVerdict::warning(90, format!("{hours:.1} h of sleep -- short night"), severity);
    }

    if hours < thresholds.low_night_hours {
        return ConfidenceVerdict::warning(
            85,
            format!("{hours:.1} h -- below the recommended range"),
            Severity::Low,
        );
    }

    ConfidenceVerdict::silent(ConfidenceState::High, 95, None)
}

/// Classify a body battery reading. Mirrors the sleep classifier's shape
/// with the valid range [1, 100].
pub fn classify_body_battery(
    snapshot: Option<&HealthSnapshot>,
    thresholds: &HealthThresholds,
) -> ConfidenceVerdict {
    let Some(battery) = snapshot.and_then(|s| s.body_battery) else {
        return ConfidenceVerdict::silent(ConfidenceState::MissingData, 0, None);
    };

    if battery < thresholds.battery_min || battery > thresholds.battery_max {
        return ConfidenceVerdict::silent(
            ConfidenceState::LowConfidence,
            20,
            Some("body battery reading out of range".to_string()),
        );
    }

    if battery < thresholds.battery_critical {
        return ConfidenceVerdict::warning(
            90,
            format!("body battery {battery} -- very low energy reserves"),
            Severity::High,
        );
    }

    if battery < thresholds.battery_low {
        return ConfidenceVerdict::warning(
            85,
            format!("body battery {battery} -- below average energy"),
            Severity::Low,
        );
    }

    ConfidenceVerdict::silent(ConfidenceState::High, 95, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()
    }

    fn thresholds() -> HealthThresholds {
        HealthThresholds::default()
    }

    #[test]
    fn missing_snapshot_does_not_warn() {
        let verdict = classify_sleep(None, &thresholds());
        assert_eq!(verdict.state, ConfidenceState::MissingData);
        assert!(!verdict.show_warning);
        assert_eq!(verdict.confidence, 0);
    }

    #[test]
    fn no_sleep_without_worn_device_is_missing() {
        let snap = HealthSnapshot::new(day()).with_steps(50);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::MissingData);
        assert!(!verdict.show_warning);
    }

    #[test]
    fn no_sleep_with_worn_device_is_low_confidence() {
        let snap = HealthSnapshot::new(day()).with_steps(4_000);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::LowConfidence);
        assert_eq!(verdict.confidence, 30);
        assert!(!verdict.show_warning);
    }

    #[test]
    fn battery_presence_counts_as_worn() {
        let snap = HealthSnapshot::new(day()).with_body_battery(60);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::LowConfidence);
    }

    #[test]
    fn very_short_sleep_is_missing_not_bad() {
        let snap = HealthSnapshot::new(day()).with_sleep_hours(0.5);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::MissingData);
        assert!(!verdict.show_warning);
    }

    #[test]
    fn implausibly_long_sleep_is_low_confidence() {
        let snap = HealthSnapshot::new(day()).with_sleep_hours(16.0);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::LowConfidence);
        assert!(!verdict.show_warning);
    }

    #[test]
    fn short_night_warns_with_severity() {
        let snap = HealthSnapshot::new(day()).with_sleep_hours(4.5);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::NegativeSignal);
        assert!(verdict.show_warning);
        assert_eq!(verdict.severity, Some(Severity::Medium));

        let snap = HealthSnapshot::new(day()).with_sleep_hours(3.5);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.severity, Some(Severity::High));
        assert_eq!(verdict.confidence, 90);
    }

    #[test]
    fn below_recommended_is_low_severity() {
        let snap = HealthSnapshot::new(day()).with_sleep_hours(5.5);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::NegativeSignal);
        assert_eq!(verdict.severity, Some(Severity::Low));
        assert_eq!(verdict.confidence, 85);
    }

    #[test]
    fn good_sleep_is_silent() {
        let snap = HealthSnapshot::new(day()).with_sleep_hours(7.5);
        let verdict = classify_sleep(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::High);
        assert!(!verdict.show_warning);
        assert!(verdict.message.is_none());
    }

    #[test]
    fn battery_out_of_range_never_escalates() {
        let snap = HealthSnapshot::new(day()).with_body_battery(140);
        let verdict = classify_body_battery(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::LowConfidence);
        assert!(!verdict.show_warning);

        let snap = HealthSnapshot::new(day()).with_body_battery(0);
        let verdict = classify_body_battery(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::LowConfidence);
    }

    #[test]
    fn battery_thresholds() {
        let snap = HealthSnapshot::new(day()).with_body_battery(20);
        let verdict = classify_body_battery(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::NegativeSignal);
        assert_eq!(verdict.severity, Some(Severity::High));

        let snap = HealthSnapshot::new(day()).with_body_battery(40);
        let verdict = classify_body_battery(Some(&snap), &thresholds());
        assert_eq!(verdict.severity, Some(Severity::Low));

        let snap = HealthSnapshot::new(day()).with_body_battery(80);
        let verdict = classify_body_battery(Some(&snap), &thresholds());
        assert_eq!(verdict.state, ConfidenceState::High);
    }
}
