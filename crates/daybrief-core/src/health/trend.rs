//! Multi-day sleep trend analysis.
//!
//! Feeds the most recent window of snapshots through the confidence
//! classifier and counts outcomes. Nights classified as missing are
//! excluded from the valid count entirely: the analyzer never guesses a
//! trend from nights the device did not observe.

use serde::{Deserialize, Serialize};

use super::confidence::{classify_sleep, ConfidenceState};
use super::{HealthSnapshot, HealthThresholds};

/// Sleep trend over the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepTrend {
    /// No history at all.
    Unknown,
    /// Fewer than three valid nights in the window.
    InsufficientData,
    Good,
    Declining,
    /// Enough validated bad nights to cut today's load budget.
    Conservation,
}

impl SleepTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::InsufficientData => "insufficient_data",
            Self::Good => "good",
            Self::Declining => "declining",
            Self::Conservation => "conservation",
        }
    }

    /// Short display label for renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown | Self::InsufficientData => "unknown",
            Self::Good => "ok",
            Self::Declining => "declining",
            Self::Conservation => "conservation mode",
        }
    }
}

/// Outcome of trend analysis over a window of snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendVerdict {
    pub trend: SleepTrend,
    pub confidence: u8,
    pub bad_nights: usize,
    pub missing_nights: usize,
    pub valid_nights: usize,
    pub conservation_mode: bool,
    pub message: Option<String>,
}

impl TrendVerdict {
    fn new(trend: SleepTrend, confidence: u8, message: Option<String>) -> Self {
        Self {
            trend,
            confidence,
            bad_nights: 0,
            missing_nights: 0,
            valid_nights: 0,
            conservation_mode: trend == SleepTrend::Conservation,
            message,
        }
    }
}

/// Analyze the sleep trend over the most recent `thresholds.trend_window`
/// snapshots. `snapshots` is expected most-recent-first, as the health
/// store returns it.
pub fn analyze_sleep_trend(
    snapshots: &[HealthSnapshot],
    thresholds: &HealthThresholds,
) -> TrendVerdict {
    if snapshots.is_empty() {
        return TrendVerdict::new(
            SleepTrend::Unknown,
            0,
            Some("no health history to analyze".to_string()),
        );
    }

    let window = &snapshots[..snapshots.len().min(thresholds.trend_window)];
    let mut bad_nights = 0usize;
    let mut missing_nights = 0usize;
    let mut valid_nights = 0usize;

    for day in window {
        match classify_sleep(Some(day), thresholds).state {
            ConfidenceState::MissingData => missing_nights += 1,
            ConfidenceState::NegativeSignal => {
                bad_nights += 1;
                valid_nights += 1;
            }
            _ => valid_nights += 1,
        }
    }

    let counted = |mut verdict: TrendVerdict| {
        verdict.bad_nights = bad_nights;
        verdict.missing_nights = missing_nights;
        verdict.valid_nights = valid_nights;
        verdict
    };

    // Not enough real signal to judge a trend -- never guess.
    if valid_nights < 3 {
        return counted(TrendVerdict::new(
            SleepTrend::InsufficientData,
            30,
            Some("not enough valid nights to judge a trend".to_string()),
        ));
    }

    if bad_nights >= 3 {
        return counted(TrendVerdict::new(
            SleepTrend::Conservation,
            85,
            Some(format!(
                "{bad_nights} rough nights out of {valid_nights} valid -- conservation mode on"
            )),
        ));
    }

    if bad_nights >= 2 {
        return counted(TrendVerdict::new(
            SleepTrend::Declining,
            75,
            Some("sleep trend is declining".to_string()),
        ));
    }

    counted(TrendVerdict::new(SleepTrend::Good, 90, None))
}
