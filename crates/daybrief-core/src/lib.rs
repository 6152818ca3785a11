//! # Daybrief Core Library
//!
//! This library provides the core business logic for Daybrief, a
//! personal daily-planning assistant. It implements a CLI-first
//! philosophy: all operations are available via a standalone CLI binary,
//! with any GUI being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Health confidence**: classifies raw device readings so missing
//!   data is never conflated with bad data, and analyzes the multi-day
//!   sleep trend that can put the planner into conservation mode
//! - **Decision engine**: derives a 0-100 priority per item, resolves
//!   time conflicts, and generates the day's brief against a load budget
//! - **Focus selector**: pure, time-aware "what's next" reclassification,
//!   re-run on every tick with a caller-supplied clock
//! - **Day close**: a wall-clock-driven state machine that summarizes
//!   and closes the day
//! - **Storage**: SQLite-backed item/health/brief/day-close persistence
//!   and TOML-based configuration
//!
//! All engine functions are synchronous, pure, and side-effect-free;
//! "now" is an explicit parameter everywhere, so nothing goes stale in a
//! process that spans midnight.
//!
//! ## Key Components
//!
//! - [`generate_daily_brief`]: the planning entry point
//! - [`select_focus`]: the current focus item for "now"
//! - [`DayCloseSession`]: the day-close state machine
//! - [`Database`]: item and record persistence
//! - [`Config`]: application configuration management

pub mod brief;
pub mod conflict;
pub mod day_close;
pub mod delegation;
pub mod error;
pub mod events;
pub mod focus;
pub mod health;
pub mod item;
pub mod priority;
pub mod storage;

pub use brief::{generate_daily_brief, BriefConfig, BriefEntry, BriefInputs, DailyBrief, DeferReason};
pub use conflict::{check_conflict, resolve_conflict, ConflictAction, ConflictReason, ConflictResolution};
pub use day_close::{
    build_summary, DayCloseError, DayCloseInput, DayCloseRecord, DayCloseSession, DayCloseState,
    DayCloseStore, DayCloseSummary, HealthRecap, Mood,
};
pub use delegation::{can_delegate, delegation_permissions, DelegationPermissions};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use focus::{classify_event_time, select_focus, FocusItem, FocusSelection, FocusState, LiveStatus};
pub use health::{
    analyze_sleep_trend, classify_body_battery, classify_sleep, generate_health_warnings,
    ConfidenceState, ConfidenceVerdict, HealthSnapshot, HealthThresholds, HealthWarning, Severity,
    SleepTrend, TrendVerdict, WarningKind,
};
pub use item::{Domain, EnergyLevel, PlanItem};
pub use priority::{calculate_priority, domain_weight, PlanningContext};
pub use storage::{Config, Database, DayCloseConfig, UserConfig};
