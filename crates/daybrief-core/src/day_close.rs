//! Day-close state machine (soft close model).
//!
//! Caps off the day with an automatically computed summary and a short
//! window for the user to engage with it:
//!
//! ```text
//! Auto ──acknowledge──> Partial ──close──> Closed
//!   │────review───────> Reviewed ─close──> Closed
//!   └────30 s timeout──────────────────────> Closed (record tagged Auto)
//! ```
//!
//! Like the timer engine it is wall-clock driven: no internal thread,
//! the caller invokes `tick(now)` periodically and the auto-close fires
//! when the deadline passes. A persistence failure surfaces as a
//! retryable error and never advances the state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreError;
use crate::events::Event;
use crate::health::HealthSnapshot;
use crate::item::PlanItem;

/// State of the day-close flow. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCloseState {
    /// Summary computed, waiting for the user (or the timeout).
    Auto,
    /// User saw the summary and tapped through.
    Partial,
    /// User explicitly reviewed and confirmed.
    Reviewed,
    /// Session finished for the day.
    Closed,
}

impl DayCloseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Partial => "partial",
            Self::Reviewed => "reviewed",
            Self::Closed => "closed",
        }
    }

    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &DayCloseState) -> bool {
        match self {
            DayCloseState::Auto => matches!(
                to,
                DayCloseState::Partial | DayCloseState::Reviewed | DayCloseState::Closed
            ),
            DayCloseState::Partial | DayCloseState::Reviewed => {
                matches!(to, DayCloseState::Closed)
            }
            DayCloseState::Closed => false, // Terminal state
        }
    }
}

impl std::str::FromStr for DayCloseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "partial" => Ok(Self::Partial),
            "reviewed" => Ok(Self::Reviewed),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown day-close state: {other}")),
        }
    }
}

/// Overall read on the day, derived from closures and body battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Productive,
    Neutral,
    Low,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::Neutral => "neutral",
            Self::Low => "low",
        }
    }
}

/// Today's health numbers echoed into the closing summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthRecap {
    pub sleep_hours: Option<f64>,
    pub body_battery: Option<i32>,
    pub steps: Option<u32>,
}

/// The automatically computed closing summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCloseSummary {
    /// Countable units of "something finished today".
    pub closures: u32,
    pub highlights: Vec<String>,
    pub mood: Mood,
    pub health: HealthRecap,
}

/// Inputs for computing the closing summary. All collections are for
/// today only; `now` decides which events already ended.
#[derive(Debug, Clone)]
pub struct DayCloseInput<'a> {
    pub completed_tasks: &'a [PlanItem],
    pub events: &'a [PlanItem],
    pub health: Option<&'a HealthSnapshot>,
    pub morning_anchor_done: bool,
    pub now: DateTime<Utc>,
}

/// Build the closing summary: count closures, pick highlights, derive
/// the mood.
pub fn build_summary(input: &DayCloseInput, step_goal: u32) -> DayCloseSummary {
    let past_events = input
        .events
        .iter()
        .filter(|e| {
            e.end_time
                .or(e.start_time)
                .map(|end| end < input.now)
                .unwrap_or(false)
        })
        .count() as u32;

    let steps = input.health.and_then(|h| h.steps);
    let battery = input.health.and_then(|h| h.body_battery);
    let walked_enough = steps.map(|s| s > step_goal).unwrap_or(false);

    let mut closures = input.completed_tasks.len() as u32 + past_events;
    if input.morning_anchor_done {
        closures += 1;
    }
    if walked_enough {
        closures += 1;
    }

    let mut highlights = Vec::new();
    if !input.completed_tasks.is_empty() {
        highlights.push(format!("{} tasks completed", input.completed_tasks.len()));
    }
    if past_events > 0 {
        highlights.push(format!("{past_events} events"));
    }
    if walked_enough {
        if let Some(steps) = steps {
            highlights.push(format!("{steps} steps"));
        }
    }
    if let Some(workout) = input.health.and_then(|h| h.workout_type.as_deref()) {
        highlights.push(workout.to_string());
    }

    let mood = if closures >= 5 && battery.map(|b| b > 50).unwrap_or(true) {
        Mood::Productive
    } else if closures < 2 && battery.map(|b| b < 30).unwrap_or(false) {
        Mood::Low
    } else {
        Mood::Neutral
    };

    DayCloseSummary {
        closures,
        highlights,
        mood,
        health: HealthRecap {
            sleep_hours: input.health.and_then(|h| h.sleep_hours),
            body_battery: battery,
            steps,
        },
    }
}

/// One persisted day-close record, keyed by (user, date). The `state`
/// records how the day was closed (`auto` means silently, by timeout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCloseRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub state: DayCloseState,
    pub summary: DayCloseSummary,
    pub tomorrow_note: Option<String>,
    pub closed_at: DateTime<Utc>,
}

/// Persistence boundary for day-close records. Upserts are keyed by
/// (user, date); the implementation is expected to serialize writes.
pub trait DayCloseStore {
    fn load_day_close(&self, user: &str, date: NaiveDate) -> Result<Option<DayCloseRecord>, CoreError>;
    fn upsert_day_close(&self, record: &DayCloseRecord) -> Result<(), CoreError>;
}

/// Day-close flow errors.
#[derive(Error, Debug)]
pub enum DayCloseError {
    /// The requested transition is not legal from the current state.
    #[error("invalid day-close transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: DayCloseState,
        to: DayCloseState,
    },

    /// Saving the record failed. The state did not advance; the same
    /// action can be retried.
    #[error("day-close save failed (retry possible): {0}")]
    SaveFailed(#[source] CoreError),
}

/// A live day-close session.
///
/// Construct with [`DayCloseSession::open`]; then either drive it with
/// user actions (`acknowledge`, `review`) or keep calling `tick(now)`
/// until the auto-close deadline fires.
#[derive(Debug, Clone)]
pub struct DayCloseSession {
    user: String,
    date: NaiveDate,
    state: DayCloseState,
    summary: DayCloseSummary,
    tomorrow_note: Option<String>,
    /// Set while the auto-close timer is armed.
    entered_auto_at: Option<DateTime<Utc>>,
    auto_close_secs: i64,
}

impl DayCloseSession {
    /// Open the day-close flow for one day.
    ///
    /// If a record already exists for (user, date) the persisted state
    /// is loaded instead of recomputing the summary, and the auto-close
    /// timer is not armed.
    pub fn open(
        store: &dyn DayCloseStore,
        user: impl Into<String>,
        date: NaiveDate,
        input: &DayCloseInput,
        step_goal: u32,
        auto_close_secs: i64,
    ) -> Result<(Self, Event), CoreError> {
        let user = user.into();
        if let Some(existing) = store.load_day_close(&user, date)? {
            log::debug!("day close for {date} already recorded as {}", existing.state.as_str());
            let event = Event::DayCloseResumed {
                date,
                state: existing.state,
                at: input.now,
            };
            return Ok((
                Self {
                    user,
                    date,
                    state: existing.state,
                    summary: existing.summary,
                    tomorrow_note: existing.tomorrow_note,
                    entered_auto_at: None,
                    auto_close_secs,
                },
                event,
            ));
        }

        let summary = build_summary(input, step_goal);
        let event = Event::DayCloseEntered {
            date,
            closures: summary.closures,
            at: input.now,
        };
        Ok((
            Self {
                user,
                date,
                state: DayCloseState::Auto,
                summary,
                tomorrow_note: None,
                entered_auto_at: Some(input.now),
                auto_close_secs,
            },
            event,
        ))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> DayCloseState {
        self.state
    }

    pub fn summary(&self) -> &DayCloseSummary {
        &self.summary
    }

    pub fn tomorrow_note(&self) -> Option<&str> {
        self.tomorrow_note.as_deref()
    }

    /// Seconds left until the auto-close fires, if the timer is armed.
    pub fn auto_close_remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        let entered = self.entered_auto_at?;
        Some((self.auto_close_secs - (now - entered).num_seconds()).max(0))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call periodically while the session is in `Auto`. Fires the
    /// silent close once the deadline passes.
    pub fn tick(
        &mut self,
        store: &dyn DayCloseStore,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, DayCloseError> {
        if self.state != DayCloseState::Auto {
            return Ok(None);
        }
        let Some(entered) = self.entered_auto_at else {
            return Ok(None);
        };
        if (now - entered).num_seconds() < self.auto_close_secs {
            return Ok(None);
        }

        // Silent close: the record keeps the `auto` tag, no note.
        self.persist(store, DayCloseState::Auto, now)?;
        self.entered_auto_at = None;
        self.state = DayCloseState::Closed;
        log::info!("day {} auto-closed after {}s", self.date, self.auto_close_secs);
        Ok(Some(Event::DayCloseAutoClosed { date: self.date, at: now }))
    }

    /// "Got it": the user acknowledged the summary. Cancels the
    /// auto-close timer.
    pub fn acknowledge(
        &mut self,
        store: &dyn DayCloseStore,
        now: DateTime<Utc>,
    ) -> Result<Event, DayCloseError> {
        self.require_transition(DayCloseState::Partial)?;
        // User acted: the timer must not fire afterwards, even if the
        // save below fails and gets retried.
        self.entered_auto_at = None;
        self.persist(store, DayCloseState::Partial, now)?;
        self.state = DayCloseState::Partial;
        Ok(Event::DayCloseAcknowledged { date: self.date, at: now })
    }

    /// Explicit review with an optional note for tomorrow.
    pub fn review(
        &mut self,
        store: &dyn DayCloseStore,
        tomorrow_note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Event, DayCloseError> {
        self.require_transition(DayCloseState::Reviewed)?;
        self.entered_auto_at = None;
        let note = tomorrow_note.filter(|n| !n.trim().is_empty());
        self.tomorrow_note = note.clone();
        self.persist_with_note(store, DayCloseState::Reviewed, note, now)?;
        self.state = DayCloseState::Reviewed;
        Ok(Event::DayCloseReviewed {
            date: self.date,
            has_tomorrow_note: self.tomorrow_note.is_some(),
            at: now,
        })
    }

    /// Finish the session after a partial or reviewed close. Purely a
    /// state move; the record was already persisted.
    pub fn close(&mut self) -> Result<(), DayCloseError> {
        self.require_transition(DayCloseState::Closed)?;
        self.state = DayCloseState::Closed;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require_transition(&self, to: DayCloseState) -> Result<(), DayCloseError> {
        if !self.state.can_transition_to(&to) {
            return Err(DayCloseError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        Ok(())
    }

    fn persist(
        &self,
        store: &dyn DayCloseStore,
        record_state: DayCloseState,
        now: DateTime<Utc>,
    ) -> Result<(), DayCloseError> {
        self.persist_with_note(store, record_state, self.tomorrow_note.clone(), now)
    }

    fn persist_with_note(
        &self,
        store: &dyn DayCloseStore,
        record_state: DayCloseState,
        tomorrow_note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DayCloseError> {
        let record = DayCloseRecord {
            user_id: self.user.clone(),
            date: self.date,
            state: record_state,
            summary: self.summary.clone(),
            tomorrow_note,
            closed_at: now,
        };
        store
            .upsert_day_close(&record)
            .map_err(DayCloseError::SaveFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 28, h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()
    }

    /// In-memory store with a failure toggle for retry tests.
    #[derive(Default)]
    struct MemStore {
        record: RefCell<Option<DayCloseRecord>>,
        fail_next: RefCell<bool>,
    }

    impl DayCloseStore for MemStore {
        fn load_day_close(
            &self,
            _user: &str,
            _date: NaiveDate,
        ) -> Result<Option<DayCloseRecord>, CoreError> {
            Ok(self.record.borrow().clone())
        }

        fn upsert_day_close(&self, record: &DayCloseRecord) -> Result<(), CoreError> {
            if self.fail_next.replace(false) {
                return Err(CoreError::Custom("store unavailable".to_string()));
            }
            *self.record.borrow_mut() = Some(record.clone());
            Ok(())
        }
    }

    fn empty_input(now: DateTime<Utc>) -> DayCloseInput<'static> {
        DayCloseInput {
            completed_tasks: &[],
            events: &[],
            health: None,
            morning_anchor_done: false,
            now,
        }
    }

    fn open(store: &MemStore, input: &DayCloseInput) -> DayCloseSession {
        DayCloseSession::open(store, "dan", today(), input, 5_000, 30)
            .unwrap()
            .0
    }

    #[test]
    fn summary_counts_all_closure_kinds() {
        let now = at(21, 0);
        let done = vec![
            PlanItem::new("t1", "Done 1", at(8, 0)).with_completed(at(12, 0)),
            PlanItem::new("t2", "Done 2", at(8, 0)).with_completed(at(14, 0)),
        ];
        let events = vec![
            PlanItem::new("e1", "Standup", at(8, 0)).with_window(at(9, 0), at(9, 30)),
            PlanItem::new("e2", "Evening", at(8, 0)).with_window(at(22, 0), at(23, 0)),
        ];
        let health = HealthSnapshot::new(today()).with_steps(7_000);
        let input = DayCloseInput {
            completed_tasks: &done,
            events: &events,
            health: Some(&health),
            morning_anchor_done: true,
            now,
        };
        let summary = build_summary(&input, 5_000);

        // 2 tasks + 1 past event + anchor + step goal.
        assert_eq!(summary.closures, 5);
        assert!(summary.highlights.iter().any(|h| h.contains("2 tasks")));
        assert!(summary.highlights.iter().any(|h| h.contains("7000 steps")));
    }

    #[test]
    fn mood_follows_closures_and_battery() {
        let now = at(21, 0);
        let done: Vec<PlanItem> = (0..5)
            .map(|i| PlanItem::new(format!("t{i}"), "Done", at(8, 0)).with_completed(at(12, 0)))
            .collect();
        let input = DayCloseInput {
            completed_tasks: &done,
            events: &[],
            health: None,
            morning_anchor_done: false,
            now,
        };
        // No battery reading still counts as productive.
        assert_eq!(build_summary(&input, 5_000).mood, Mood::Productive);

        let tired = HealthSnapshot::new(today()).with_body_battery(20);
        let input = DayCloseInput {
            completed_tasks: &[],
            events: &[],
            health: Some(&tired),
            morning_anchor_done: false,
            now,
        };
        assert_eq!(build_summary(&input, 5_000).mood, Mood::Low);

        let ok = HealthSnapshot::new(today()).with_body_battery(70);
        let input = DayCloseInput {
            completed_tasks: &[],
            events: &[],
            health: Some(&ok),
            morning_anchor_done: false,
            now,
        };
        assert_eq!(build_summary(&input, 5_000).mood, Mood::Neutral);
    }

    #[test]
    fn timeout_closes_silently_with_auto_tag() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));
        assert_eq!(session.state(), DayCloseState::Auto);

        // Before the deadline nothing happens.
        let event = session.tick(&store, now + Duration::seconds(29)).unwrap();
        assert!(event.is_none());
        assert_eq!(session.state(), DayCloseState::Auto);

        let event = session.tick(&store, now + Duration::seconds(30)).unwrap();
        assert!(matches!(event, Some(Event::DayCloseAutoClosed { .. })));
        assert_eq!(session.state(), DayCloseState::Closed);

        let record = store.record.borrow().clone().unwrap();
        assert_eq!(record.state, DayCloseState::Auto);
        assert!(record.tomorrow_note.is_none());
    }

    #[test]
    fn acknowledge_cancels_the_timer() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));

        session.acknowledge(&store, now + Duration::seconds(5)).unwrap();
        assert_eq!(session.state(), DayCloseState::Partial);

        // The deadline passing afterwards must not double-transition.
        let event = session.tick(&store, now + Duration::seconds(60)).unwrap();
        assert!(event.is_none());
        assert_eq!(store.record.borrow().clone().unwrap().state, DayCloseState::Partial);

        session.close().unwrap();
        assert_eq!(session.state(), DayCloseState::Closed);
    }

    #[test]
    fn review_persists_the_tomorrow_note() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));

        session
            .review(&store, Some("call the bank".to_string()), now + Duration::seconds(10))
            .unwrap();
        assert_eq!(session.state(), DayCloseState::Reviewed);

        let record = store.record.borrow().clone().unwrap();
        assert_eq!(record.state, DayCloseState::Reviewed);
        assert_eq!(record.tomorrow_note.as_deref(), Some("call the bank"));
    }

    #[test]
    fn save_failure_does_not_advance_state() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));

        *store.fail_next.borrow_mut() = true;
        let err = session.acknowledge(&store, now + Duration::seconds(5));
        assert!(matches!(err, Err(DayCloseError::SaveFailed(_))));
        assert_eq!(session.state(), DayCloseState::Auto);

        // Retry succeeds and advances.
        session.acknowledge(&store, now + Duration::seconds(8)).unwrap();
        assert_eq!(session.state(), DayCloseState::Partial);
    }

    #[test]
    fn failed_save_still_cancels_the_timer() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));

        *store.fail_next.borrow_mut() = true;
        let _ = session.acknowledge(&store, now + Duration::seconds(5));

        // User acted; the silent auto-close must not fire while they retry.
        let event = session.tick(&store, now + Duration::seconds(90)).unwrap();
        assert!(event.is_none());
        assert!(store.record.borrow().is_none());
    }

    #[test]
    fn existing_record_is_loaded_not_recomputed() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));
        session.acknowledge(&store, now).unwrap();

        let (resumed, event) =
            DayCloseSession::open(&store, "dan", today(), &empty_input(at(23, 0)), 5_000, 30)
                .unwrap();
        assert_eq!(resumed.state(), DayCloseState::Partial);
        assert!(matches!(event, Event::DayCloseResumed { .. }));
        assert!(resumed.auto_close_remaining_secs(at(23, 0)).is_none());
    }

    #[test]
    fn terminal_state_rejects_further_actions() {
        let store = MemStore::default();
        let now = at(22, 0);
        let mut session = open(&store, &empty_input(now));
        session.tick(&store, now + Duration::seconds(31)).unwrap();

        let err = session.acknowledge(&store, now + Duration::seconds(40));
        assert!(matches!(err, Err(DayCloseError::InvalidTransition { .. })));
    }

    #[test]
    fn transition_table_is_one_way() {
        assert!(DayCloseState::Auto.can_transition_to(&DayCloseState::Partial));
        assert!(DayCloseState::Auto.can_transition_to(&DayCloseState::Reviewed));
        assert!(DayCloseState::Auto.can_transition_to(&DayCloseState::Closed));
        assert!(DayCloseState::Partial.can_transition_to(&DayCloseState::Closed));
        assert!(!DayCloseState::Partial.can_transition_to(&DayCloseState::Auto));
        assert!(!DayCloseState::Reviewed.can_transition_to(&DayCloseState::Partial));
        assert!(!DayCloseState::Closed.can_transition_to(&DayCloseState::Auto));
    }
}
