//! Plan item types and utilities.
//!
//! A [`PlanItem`] is one task or calendar event under consideration for
//! the day. Items come from the item store or user capture; the engine
//! annotates copies of them (derived priority, defer reason) but never
//! deletes them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Life domain an item belongs to. Drives the base priority weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Family commitments. Always win.
    Family,
    /// Health and recovery.
    Health,
    /// Locked events that cannot be rescheduled.
    Immutable,
    /// Time-sensitive work.
    Urgent,
    /// Default work.
    Work,
    /// Personal, not urgent.
    Personal,
    /// Idea backlog. No claim on today.
    Parking,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::Health => "health",
            Self::Immutable => "immutable",
            Self::Urgent => "urgent",
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Parking => "parking",
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Domain::Work
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "family" => Ok(Self::Family),
            "health" => Ok(Self::Health),
            "immutable" => Ok(Self::Immutable),
            "urgent" => Ok(Self::Urgent),
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "parking" => Ok(Self::Parking),
            other => Err(format!("unknown domain: {other}")),
        }
    }
}

/// Energy level required to execute an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    /// Low energy (e.g., end of day)
    Low,
    /// Medium energy (default)
    Medium,
    /// High energy (e.g., morning)
    High,
}

impl Default for EnergyLevel {
    fn default() -> Self {
        EnergyLevel::Medium
    }
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for EnergyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown energy level: {other}")),
        }
    }
}

/// Duration assumed for a timed item that has no end time.
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;

fn default_load() -> u32 {
    10
}

/// A task or event under consideration for today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Hard priority ceiling: family always wins.
    #[serde(default)]
    pub family_override: bool,
    /// Locked in place; can never be rescheduled.
    #[serde(default)]
    pub immutable: bool,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub energy: EnergyLevel,
    /// Someone else is blocked on this item.
    #[serde(default)]
    pub has_waiting_dependency: bool,
    /// Effort units this item consumes from the day's load budget.
    #[serde(default = "default_load")]
    pub estimated_load: u32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PlanItem {
    /// Create a new item with defaults. `created_at` is caller-supplied so
    /// the core never reads the process clock.
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            domain: Domain::default(),
            labels: Vec::new(),
            family_override: false,
            immutable: false,
            due_date: None,
            energy: EnergyLevel::default(),
            has_waiting_dependency: false,
            estimated_load: default_load(),
            start_time: None,
            end_time: None,
            completed: false,
            completed_at: None,
            created_at,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_family_override(mut self, family_override: bool) -> Self {
        self.family_override = family_override;
        self
    }

    pub fn with_immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_energy(mut self, energy: EnergyLevel) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_waiting_dependency(mut self, waiting: bool) -> Self {
        self.has_waiting_dependency = waiting;
        self
    }

    pub fn with_load(mut self, estimated_load: u32) -> Self {
        self.estimated_load = estimated_load;
        self
    }

    pub fn with_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn with_completed(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed = true;
        self.completed_at = Some(completed_at);
        self
    }

    /// A family commitment, either via the explicit override flag or a
    /// `family` label.
    pub fn is_family(&self) -> bool {
        self.family_override || self.labels.iter().any(|l| l == "family")
    }

    /// End of the item's occupied interval. A timed item without an end
    /// is assumed to run for [`DEFAULT_EVENT_DURATION_MINUTES`].
    pub fn effective_end(&self) -> Option<DateTime<Utc>> {
        match (self.start_time, self.end_time) {
            (_, Some(end)) => Some(end),
            (Some(start), None) => Some(start + Duration::minutes(DEFAULT_EVENT_DURATION_MINUTES)),
            (None, None) => None,
        }
    }

    /// Check whether this item's `[start, end)` interval overlaps another's.
    /// Items without a start time never overlap anything.
    pub fn overlaps(&self, other: &Self) -> bool {
        let (Some(a_start), Some(b_start)) = (self.start_time, other.start_time) else {
            return false;
        };
        let a_end = self.effective_end().unwrap_or(a_start);
        let b_end = other.effective_end().unwrap_or(b_start);
        a_start < b_end && b_start < a_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 28, h, m, 0).unwrap()
    }

    #[test]
    fn family_label_counts_as_family() {
        let item = PlanItem::new("1", "Dinner", at(8, 0)).with_label("family");
        assert!(item.is_family());
        assert!(!item.family_override);
    }

    #[test]
    fn overlap_uses_one_hour_default_end() {
        let a = PlanItem::new("a", "Call", at(8, 0)).with_start(at(10, 0));
        let b = PlanItem::new("b", "Standup", at(8, 0)).with_window(at(10, 30), at(11, 30));
        assert!(a.overlaps(&b));

        let c = PlanItem::new("c", "Late", at(8, 0)).with_window(at(11, 30), at(12, 0));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn untimed_items_never_overlap() {
        let a = PlanItem::new("a", "Task", at(8, 0));
        let b = PlanItem::new("b", "Event", at(8, 0)).with_window(at(9, 0), at(10, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn item_serialization_roundtrip() {
        let item = PlanItem::new("t-1", "Pay rent", at(8, 0))
            .with_domain(Domain::Work)
            .with_due_date(at(12, 0))
            .with_load(10);
        let json = serde_json::to_string(&item).unwrap();
        let decoded: PlanItem = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.domain, Domain::Work);
        assert_eq!(decoded.estimated_load, 10);
    }
}
