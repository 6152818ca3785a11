//! Pairwise conflict detection and resolution.
//!
//! Two timed items conflict when their `[start, end)` intervals overlap
//! (an item with no end time is assumed to occupy one hour). Resolution
//! walks a short-circuiting ladder: family override, then immutability,
//! then derived priority.

use serde::{Deserialize, Serialize};

use crate::item::PlanItem;
use crate::priority::{calculate_priority, PlanningContext};

/// What should happen to the losing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    /// Push the loser to later today / tomorrow.
    Defer,
    /// Find the loser a new slot.
    Reschedule,
    /// Drop the loser to the idea backlog.
    Parking,
}

impl ConflictAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defer => "defer",
            Self::Reschedule => "reschedule",
            Self::Parking => "parking",
        }
    }
}

/// Which ladder rule decided the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    FamilyOverride,
    ImmutableEvent,
    Priority,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FamilyOverride => "family_override",
            Self::ImmutableEvent => "immutable_event",
            Self::Priority => "priority",
        }
    }
}

/// Outcome of resolving one conflicting pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictResolution {
    pub winner: PlanItem,
    pub loser: PlanItem,
    pub action: ConflictAction,
    pub reason: ConflictReason,
    pub winner_priority: u8,
    pub loser_priority: u8,
}

/// True iff the two items occupy overlapping time.
pub fn check_conflict(a: &PlanItem, b: &PlanItem) -> bool {
    a.overlaps(b)
}

/// Resolve a conflicting pair.
///
/// The loser of a family override is only ever deferred, never
/// auto-rescheduled against a family commitment. Losers below priority
/// 40 go straight to parking.
pub fn resolve_conflict(a: &PlanItem, b: &PlanItem, ctx: &PlanningContext) -> ConflictResolution {
    let priority_a = calculate_priority(a, ctx);
    let priority_b = calculate_priority(b, ctx);

    if a.family_override != b.family_override {
        let (winner, loser, wp, lp) = if a.family_override {
            (a, b, priority_a, priority_b)
        } else {
            (b, a, priority_b, priority_a)
        };
        return ConflictResolution {
            winner: winner.clone(),
            loser: loser.clone(),
            action: ConflictAction::Defer,
            reason: ConflictReason::FamilyOverride,
            winner_priority: wp,
            loser_priority: lp,
        };
    }

    if a.immutable != b.immutable {
        let (winner, loser, wp, lp) = if a.immutable {
            (a, b, priority_a, priority_b)
        } else {
            (b, a, priority_b, priority_a)
        };
        return ConflictResolution {
            winner: winner.clone(),
            loser: loser.clone(),
            action: ConflictAction::Reschedule,
            reason: ConflictReason::ImmutableEvent,
            winner_priority: wp,
            loser_priority: lp,
        };
    }

    let a_wins = match priority_a.cmp(&priority_b) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => tie_break_first_wins(a, b),
    };

    let (winner, loser, wp, lp) = if a_wins {
        (a, b, priority_a, priority_b)
    } else {
        (b, a, priority_b, priority_a)
    };
    let action = if lp < 40 {
        ConflictAction::Parking
    } else {
        ConflictAction::Defer
    };
    ConflictResolution {
        winner: winner.clone(),
        loser: loser.clone(),
        action,
        reason: ConflictReason::Priority,
        winner_priority: wp,
        loser_priority: lp,
    }
}

/// Deterministic tie-break on equal priority: the earlier start wins, a
/// timed item beats an untimed one, and as a final fallback the first
/// argument wins.
fn tie_break_first_wins(a: &PlanItem, b: &PlanItem) -> bool {
    match (a.start_time, b.start_time) {
        (Some(a_start), Some(b_start)) => a_start <= b_start,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => true,
    }
}
