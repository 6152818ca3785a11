//! Derived priority calculation.
//!
//! Priority is never user-set -- it is computed per item per planning run
//! from the domain weight ladder plus contextual boosts. The ladder is
//! additive-then-clamped, not multiplicative, so overrides compose
//! predictably.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{Domain, EnergyLevel, PlanItem};

/// Context for one planning run.
///
/// `now` is caller-supplied on every run; nothing in the engine reads
/// the process clock, so a long-running process never plans against a
/// stale "today".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanningContext {
    pub now: DateTime<Utc>,
    pub conservation_mode: bool,
}

impl PlanningContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            conservation_mode: false,
        }
    }

    pub fn with_conservation(mut self, conservation_mode: bool) -> Self {
        self.conservation_mode = conservation_mode;
        self
    }
}

/// Base priority weight per domain.
pub fn domain_weight(domain: Domain) -> i32 {
    match domain {
        Domain::Family => 100,
        Domain::Health => 90,
        Domain::Immutable => 85,
        Domain::Urgent => 80,
        Domain::Work => 50,
        Domain::Personal => 40,
        Domain::Parking => 0,
    }
}

/// Calculate the derived priority for one item, 0-100.
///
/// Rules in order: family ceiling, immutable floor, due-date urgency
/// boost, conservation penalty for high-energy items, dependency boost,
/// final clamp.
pub fn calculate_priority(item: &PlanItem, ctx: &PlanningContext) -> u8 {
    // Family always wins, unconditionally.
    if item.is_family() {
        return 100;
    }

    let mut score = domain_weight(item.domain);

    // Immutable events can't be moved.
    if item.immutable {
        score = score.max(85);
    }

    // Time sensitivity boost. Overdue counts as "under 2 hours".
    if let Some(due) = item.due_date {
        let minutes_until_due = (due - ctx.now).num_minutes();
        if minutes_until_due < 2 * 60 {
            score += 30;
        } else if minutes_until_due < 24 * 60 {
            score += 15;
        } else if minutes_until_due < 48 * 60 {
            score += 5;
        }
    }

    // Defer high-energy work when capacity is reduced.
    if ctx.conservation_mode && item.energy == EnergyLevel::High {
        score -= 20;
    }

    // Unblocking others is rewarded.
    if item.has_waiting_dependency {
        score += 15;
    }

    score.clamp(0, 100) as u8
}

/// Annotate and sort items by derived priority, descending. The sort is
/// stable: equal scores keep encounter order.
pub fn rank_items(items: &[PlanItem], ctx: &PlanningContext) -> Vec<(PlanItem, u8)> {
    let mut ranked: Vec<(PlanItem, u8)> = items
        .iter()
        .map(|item| (item.clone(), calculate_priority(item, ctx)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}
