//! Daily brief generation.
//!
//! One brief per run: score every item, sort, then fill the day's load
//! budget greedily by priority. The split is greedy, not budget-optimal
//! -- once a higher-priority item has exhausted the budget, no
//! lower-priority-but-smaller item is backtracked in. That trade-off is
//! deliberate: the plan must be explainable in one pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::health::{
    analyze_sleep_trend, generate_health_warnings, HealthSnapshot, HealthThresholds,
    HealthWarning, SleepTrend,
};
use crate::item::{EnergyLevel, PlanItem};
use crate::priority::{rank_items, PlanningContext};

/// Load budget configuration for the greedy fill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BriefConfig {
    /// Effort units admitted on a normal day.
    #[serde(default = "default_max_load")]
    pub max_load: u32,
    /// Effort units admitted under conservation mode.
    #[serde(default = "default_conservation_max_load")]
    pub conservation_max_load: u32,
}

fn default_max_load() -> u32 {
    80
}
fn default_conservation_max_load() -> u32 {
    60
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            max_load: default_max_load(),
            conservation_max_load: default_conservation_max_load(),
        }
    }
}

/// Why an item was kept out of today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferReason {
    /// High-energy item deferred while capacity is reduced.
    ConservationMode,
    /// The load budget was already spent.
    LoadLimit,
}

impl DeferReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConservationMode => "conservation_mode",
            Self::LoadLimit => "load_limit",
        }
    }
}

/// One item as it appears in the brief, annotated with the run's
/// derived priority and, for deferred items, the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefEntry {
    #[serde(flatten)]
    pub item: PlanItem,
    pub derived_priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defer_reason: Option<DeferReason>,
}

/// The day's plan. Regenerated wholesale each run, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBrief {
    pub doing_today: Vec<String>,
    pub not_doing_today: Vec<String>,
    pub doing_today_structured: Vec<BriefEntry>,
    pub not_doing_today_structured: Vec<BriefEntry>,
    /// Percentage of the load budget consumed, clamped to [0, 100].
    pub load_score: u8,
    pub warnings: Vec<HealthWarning>,
    pub conservation_mode: bool,
    pub sleep_trend: SleepTrend,
    pub generated_at: DateTime<Utc>,
}

/// Inputs for one brief run. `now` is caller-supplied; the generator
/// never reads the process clock.
#[derive(Debug, Clone)]
pub struct BriefInputs<'a> {
    pub items: &'a [PlanItem],
    pub health_today: Option<&'a HealthSnapshot>,
    pub health_history: &'a [HealthSnapshot],
    pub now: DateTime<Utc>,
}

/// Generate the daily brief: trend, warnings, scores, greedy budget fill.
pub fn generate_daily_brief(
    inputs: &BriefInputs,
    thresholds: &HealthThresholds,
    config: &BriefConfig,
) -> DailyBrief {
    let trend = analyze_sleep_trend(inputs.health_history, thresholds);
    let conservation_mode = trend.conservation_mode;
    if conservation_mode {
        log::info!(
            "conservation mode active: {} bad nights of {} valid",
            trend.bad_nights,
            trend.valid_nights
        );
    }

    let warnings =
        generate_health_warnings(inputs.health_today, inputs.health_history, thresholds);

    let ctx = PlanningContext::new(inputs.now).with_conservation(conservation_mode);
    let ranked = rank_items(inputs.items, &ctx);

    let max_load = if conservation_mode {
        config.conservation_max_load
    } else {
        config.max_load
    };

    let mut doing: Vec<BriefEntry> = Vec::new();
    let mut not_doing: Vec<BriefEntry> = Vec::new();
    let mut current_load: u32 = 0;

    for (item, derived_priority) in ranked {
        let item_load = item.estimated_load;

        // Family items always make the cut, budget or not.
        if item.is_family() {
            current_load += item_load;
            doing.push(BriefEntry {
                item,
                derived_priority,
                defer_reason: None,
            });
            continue;
        }

        // High-energy work sits out conservation days entirely.
        if conservation_mode && item.energy == EnergyLevel::High {
            not_doing.push(BriefEntry {
                item,
                derived_priority,
                defer_reason: Some(DeferReason::ConservationMode),
            });
            continue;
        }

        if current_load + item_load <= max_load {
            current_load += item_load;
            doing.push(BriefEntry {
                item,
                derived_priority,
                defer_reason: None,
            });
        } else {
            not_doing.push(BriefEntry {
                item,
                derived_priority,
                defer_reason: Some(DeferReason::LoadLimit),
            });
        }
    }

    let load_score = ((current_load as f64 / max_load as f64) * 100.0)
        .round()
        .clamp(0.0, 100.0) as u8;

    log::debug!(
        "brief generated: {} doing, {} deferred, load {load_score}",
        doing.len(),
        not_doing.len()
    );

    DailyBrief {
        doing_today: doing.iter().map(|e| e.item.title.clone()).collect(),
        not_doing_today: not_doing.iter().map(|e| e.item.title.clone()).collect(),
        doing_today_structured: doing,
        not_doing_today_structured: not_doing,
        load_score,
        warnings,
        conservation_mode,
        sleep_trend: trend.trend,
        generated_at: inputs.now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Domain;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 28, 9, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn bad_nights(n: usize) -> Vec<HealthSnapshot> {
        (0..n)
            .map(|i| HealthSnapshot::new(day(28 - i as u32)).with_sleep_hours(4.5))
            .collect()
    }

    fn generate(items: &[PlanItem], history: &[HealthSnapshot]) -> DailyBrief {
        generate_daily_brief(
            &BriefInputs {
                items,
                health_today: None,
                health_history: history,
                now: now(),
            },
            &HealthThresholds::default(),
            &BriefConfig::default(),
        )
    }

    #[test]
    fn empty_inputs_produce_an_empty_plan() {
        let brief = generate(&[], &[]);
        assert!(brief.doing_today.is_empty());
        assert_eq!(brief.load_score, 0);
        assert!(!brief.conservation_mode);
        assert_eq!(brief.sleep_trend, SleepTrend::Unknown);
    }

    #[test]
    fn items_are_admitted_by_priority_until_budget() {
        let items = vec![
            PlanItem::new("low", "Low", now()).with_domain(Domain::Personal).with_load(30),
            PlanItem::new("high", "High", now()).with_domain(Domain::Health).with_load(60),
            PlanItem::new("mid", "Mid", now()).with_domain(Domain::Work).with_load(30),
        ];
        let brief = generate(&items, &[]);

        // Health (90) fits, work (50) would overflow 80, personal (40) too.
        assert_eq!(brief.doing_today, vec!["High"]);
        assert_eq!(brief.not_doing_today.len(), 2);
        assert!(brief
            .not_doing_today_structured
            .iter()
            .all(|e| e.defer_reason == Some(DeferReason::LoadLimit)));
    }

    #[test]
    fn greedy_fill_never_backtracks() {
        // A smaller low-priority item is not pulled in after a large
        // higher-priority one exhausts the budget.
        let items = vec![
            PlanItem::new("big", "Big", now()).with_domain(Domain::Urgent).with_load(80),
            PlanItem::new("tiny", "Tiny", now()).with_domain(Domain::Personal).with_load(5),
        ];
        let brief = generate(&items, &[]);
        assert_eq!(brief.doing_today, vec!["Big"]);
        assert_eq!(brief.not_doing_today, vec!["Tiny"]);
    }

    #[test]
    fn family_is_admitted_even_over_budget() {
        let items = vec![
            PlanItem::new("work", "Work", now()).with_domain(Domain::Urgent).with_load(40),
            PlanItem::new("dinner", "Family dinner", now())
                .with_label("family")
                .with_load(90),
        ];
        let brief = generate(&items, &[]);

        // The family item alone exceeds the 80-unit budget and is
        // admitted anyway; the work item no longer fits.
        assert!(brief.doing_today.contains(&"Family dinner".to_string()));
        assert_eq!(brief.not_doing_today, vec!["Work"]);
        assert_eq!(brief.load_score, 100);
    }

    #[test]
    fn conservation_defers_high_energy_regardless_of_budget() {
        let items = vec![
            PlanItem::new("gym", "Gym", now())
                .with_domain(Domain::Health)
                .with_energy(EnergyLevel::High)
                .with_load(10),
        ];
        let brief = generate(&items, &bad_nights(3));
        assert!(brief.conservation_mode);
        assert!(brief.doing_today.is_empty());
        assert_eq!(
            brief.not_doing_today_structured[0].defer_reason,
            Some(DeferReason::ConservationMode)
        );
    }

    #[test]
    fn conservation_shrinks_the_budget() {
        let items = vec![
            PlanItem::new("a", "A", now()).with_domain(Domain::Work).with_load(40),
            PlanItem::new("b", "B", now()).with_domain(Domain::Work).with_load(40),
        ];

        let normal = generate(&items, &[]);
        assert_eq!(normal.doing_today.len(), 2);

        let conserving = generate(&items, &bad_nights(3));
        assert_eq!(conserving.doing_today.len(), 1);
        assert_eq!(conserving.not_doing_today.len(), 1);
    }

    #[test]
    fn load_score_is_clamped() {
        let items = vec![
            PlanItem::new("d1", "Dinner", now()).with_label("family").with_load(90),
            PlanItem::new("d2", "Outing", now()).with_label("family").with_load(90),
        ];
        let brief = generate(&items, &[]);
        assert_eq!(brief.load_score, 100);
    }

    #[test]
    fn end_to_end_conservation_scenario() {
        let items = vec![
            PlanItem::new("rent", "Pay rent", now())
                .with_domain(Domain::Work)
                .with_due_date(now() + Duration::hours(1))
                .with_load(10),
            PlanItem::new("dinner", "Family dinner", now())
                .with_label("family")
                .with_load(20),
            PlanItem::new("gym", "Gym", now())
                .with_domain(Domain::Health)
                .with_energy(EnergyLevel::High)
                .with_load(30),
        ];
        let brief = generate(&items, &bad_nights(3));

        assert!(brief.conservation_mode);
        assert!(brief.doing_today.contains(&"Family dinner".to_string()));
        assert!(brief.doing_today.contains(&"Pay rent".to_string()));
        assert_eq!(brief.not_doing_today, vec!["Gym"]);
        assert_eq!(
            brief.not_doing_today_structured[0].defer_reason,
            Some(DeferReason::ConservationMode)
        );
        // Conservation trend itself is one of the warnings.
        assert!(brief
            .warnings
            .iter()
            .any(|w| w.kind == crate::health::WarningKind::Conservation));
    }

    #[test]
    fn equal_priority_keeps_encounter_order() {
        let items = vec![
            PlanItem::new("first", "First", now()).with_domain(Domain::Work).with_load(40),
            PlanItem::new("second", "Second", now()).with_domain(Domain::Work).with_load(40),
            PlanItem::new("third", "Third", now()).with_domain(Domain::Work).with_load(40),
        ];
        let brief = generate(&items, &[]);
        assert_eq!(brief.doing_today, vec!["First", "Second"]);
        assert_eq!(brief.not_doing_today, vec!["Third"]);
    }
}
