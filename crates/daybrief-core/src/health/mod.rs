//! Health data ingestion types and the confidence layer.
//!
//! Raw device readings are never trusted directly: every metric passes
//! through a confidence classifier before it may influence planning or
//! surface a warning. Missing data is never conflated with bad data.

pub mod confidence;
pub mod trend;
pub mod warnings;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use confidence::{
    classify_body_battery, classify_sleep, ConfidenceState, ConfidenceVerdict, Severity,
};
pub use trend::{analyze_sleep_trend, SleepTrend, TrendVerdict};
pub use warnings::{generate_health_warnings, HealthWarning, WarningKind};

/// One day's physiological reading from the device sync.
///
/// Every field except `date` is optional: a missing value means the
/// device did not report it, not that the value was zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub date: NaiveDate,
    pub sleep_hours: Option<f64>,
    pub steps: Option<u32>,
    /// Raw body battery as synced. May be out of the valid [1, 100]
    /// range on sync errors; the classifier downgrades those.
    pub body_battery: Option<i32>,
    pub stress_level: Option<i32>,
    pub workout_type: Option<String>,
}

impl HealthSnapshot {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_hours: None,
            steps: None,
            body_battery: None,
            stress_level: None,
            workout_type: None,
        }
    }

    pub fn with_sleep_hours(mut self, hours: f64) -> Self {
        self.sleep_hours = Some(hours);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_body_battery(mut self, battery: i32) -> Self {
        self.body_battery = Some(battery);
        self
    }

    pub fn with_stress_level(mut self, stress: i32) -> Self {
        self.stress_level = Some(stress);
        self
    }

    pub fn with_workout(mut self, workout_type: impl Into<String>) -> Self {
        self.workout_type = Some(workout_type.into());
        self
    }
}

/// Thresholds for the confidence layer.
///
/// Kept as data rather than constants so the config file can tune them
/// without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Below this many hours the device was likely not worn.
    #[serde(default = "default_sleep_min_hours")]
    pub sleep_min_hours: f64,
    /// Above this many hours the reading is a sync error.
    #[serde(default = "default_sleep_max_hours")]
    pub sleep_max_hours: f64,
    /// A short night: negative signal, high/medium severity.
    #[serde(default = "default_short_night_hours")]
    pub short_night_hours: f64,
    /// Below recommended: negative signal, low severity.
    #[serde(default = "default_low_night_hours")]
    pub low_night_hours: f64,
    /// Minimum step count that proves the device was worn.
    #[serde(default = "default_steps_min_for_worn")]
    pub steps_min_for_worn: u32,
    /// Valid body battery range (inclusive).
    #[serde(default = "default_battery_min")]
    pub battery_min: i32,
    #[serde(default = "default_battery_max")]
    pub battery_max: i32,
    /// Battery below this is a high-severity negative signal.
    #[serde(default = "default_battery_critical")]
    pub battery_critical: i32,
    /// Battery below this is a low-severity negative signal.
    #[serde(default = "default_battery_low")]
    pub battery_low: i32,
    /// Days of history the trend analyzer looks at.
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    /// A verdict may only surface a user-visible warning at or above
    /// this confidence.
    #[serde(default = "default_warning_confidence_floor")]
    pub warning_confidence_floor: u8,
}

fn default_sleep_min_hours() -> f64 {
    1.0
}
fn default_sleep_max_hours() -> f64 {
    14.0
}
fn default_short_night_hours() -> f64 {
    5.0
}
fn default_low_night_hours() -> f64 {
    6.0
}
fn default_steps_min_for_worn() -> u32 {
    100
}
fn default_battery_min() -> i32 {
    1
}
fn default_battery_max() -> i32 {
    100
}
fn default_battery_critical() -> i32 {
    25
}
fn default_battery_low() -> i32 {
    50
}
fn default_trend_window() -> usize {
    5
}
fn default_warning_confidence_floor() -> u8 {
    75
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            sleep_min_hours: default_sleep_min_hours(),
            sleep_max_hours: default_sleep_max_hours(),
            short_night_hours: default_short_night_hours(),
            low_night_hours: default_low_night_hours(),
            steps_min_for_worn: default_steps_min_for_worn(),
            battery_min: default_battery_min(),
            battery_max: default_battery_max(),
            battery_critical: default_battery_critical(),
            battery_low: default_battery_low(),
            trend_window: default_trend_window(),
            warning_confidence_floor: default_warning_confidence_floor(),
        }
    }
}
