//! Lifecycle events produced by the engine.
//!
//! Every observable state change produces an Event. Callers (CLI, a
//! future GUI shim) render or forward them; nothing inside the core
//! subscribes to its own events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::day_close::DayCloseState;
use crate::health::SleepTrend;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A daily brief was generated and is ready to persist.
    BriefGenerated {
        date: NaiveDate,
        load_score: u8,
        conservation_mode: bool,
        sleep_trend: SleepTrend,
        doing_count: usize,
        deferred_count: usize,
        at: DateTime<Utc>,
    },
    /// A day-close session started in the auto state.
    DayCloseEntered {
        date: NaiveDate,
        closures: u32,
        at: DateTime<Utc>,
    },
    /// The user tapped "got it" before the auto-close deadline.
    DayCloseAcknowledged {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// The user reviewed the day and confirmed, optionally with a note
    /// for tomorrow.
    DayCloseReviewed {
        date: NaiveDate,
        has_tomorrow_note: bool,
        at: DateTime<Utc>,
    },
    /// The auto-close deadline passed with no user action.
    DayCloseAutoClosed {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// A previously persisted day-close record was loaded instead of
    /// recomputing the summary.
    DayCloseResumed {
        date: NaiveDate,
        state: DayCloseState,
        at: DateTime<Utc>,
    },
}
