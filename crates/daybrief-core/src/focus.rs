//! Time-aware focus selection.
//!
//! Reclassifies every planned item against the caller-supplied "now" and
//! picks the single item the user should be looking at. Pure and cheap:
//! callers re-run it on every tick rather than caching a selection made
//! at brief-generation time, so the focus tracks real time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::PlanItem;

/// Where an item sits relative to the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveStatus {
    Past,
    Ongoing,
    Upcoming,
}

impl LiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Ongoing => "ongoing",
            Self::Upcoming => "upcoming",
        }
    }
}

/// Classify one item against `now`.
///
/// An item with a start but no end that has already started counts as
/// ongoing -- the optimistic default, so a long or open-ended activity
/// is never silently dropped. An item with no times at all is a plain
/// task and is always available, i.e. upcoming.
pub fn classify_event_time(item: &PlanItem, now: DateTime<Utc>) -> LiveStatus {
    if let Some(end) = item.end_time {
        if end < now {
            return LiveStatus::Past;
        }
    }
    if let Some(start) = item.start_time {
        if start <= now && item.end_time.map_or(true, |end| end >= now) {
            return LiveStatus::Ongoing;
        }
        if start > now {
            return LiveStatus::Upcoming;
        }
        return LiveStatus::Past;
    }
    LiveStatus::Upcoming
}

/// An item tagged with its live classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusItem {
    #[serde(flatten)]
    pub item: PlanItem,
    pub live_status: LiveStatus,
}

/// The chosen focus: one item and the status that won it the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSelection {
    pub item: PlanItem,
    pub status: LiveStatus,
}

/// Pick the current focus: the first ongoing item, else the first
/// upcoming one (plain tasks count as upcoming), else nothing -- the
/// caller renders a calm empty state rather than stale information.
pub fn select_focus(items: &[PlanItem], now: DateTime<Utc>) -> Option<FocusSelection> {
    let mut first_upcoming: Option<&PlanItem> = None;
    for item in items {
        match classify_event_time(item, now) {
            LiveStatus::Ongoing => {
                return Some(FocusSelection {
                    item: item.clone(),
                    status: LiveStatus::Ongoing,
                });
            }
            LiveStatus::Upcoming => {
                first_upcoming.get_or_insert(item);
            }
            LiveStatus::Past => {}
        }
    }
    first_upcoming.map(|item| FocusSelection {
        item: item.clone(),
        status: LiveStatus::Upcoming,
    })
}

/// Full bucket snapshot for renderers: timed items split by status,
/// untimed tasks kept apart. Transient -- recompute on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusState {
    pub ongoing: Vec<FocusItem>,
    pub upcoming: Vec<FocusItem>,
    pub past: Vec<FocusItem>,
    pub tasks: Vec<FocusItem>,
    pub computed_at: DateTime<Utc>,
}

impl FocusState {
    pub fn compute(items: &[PlanItem], now: DateTime<Utc>) -> Self {
        let mut state = Self {
            ongoing: Vec::new(),
            upcoming: Vec::new(),
            past: Vec::new(),
            tasks: Vec::new(),
            computed_at: now,
        };
        for item in items {
            let live_status = classify_event_time(item, now);
            let tagged = FocusItem {
                item: item.clone(),
                live_status,
            };
            if item.start_time.is_none() && item.end_time.is_none() {
                state.tasks.push(tagged);
                continue;
            }
            match live_status {
                LiveStatus::Ongoing => state.ongoing.push(tagged),
                LiveStatus::Upcoming => state.upcoming.push(tagged),
                LiveStatus::Past => state.past.push(tagged),
            }
        }
        state
    }
}
