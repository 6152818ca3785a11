//! Health snapshot commands.

use clap::Subcommand;
use daybrief_core::storage::Config;
use daybrief_core::{
    analyze_sleep_trend, classify_body_battery, classify_sleep, generate_health_warnings, Database,
    HealthSnapshot,
};

use super::common::{parse_date, print_json};

#[derive(Subcommand)]
pub enum HealthAction {
    /// Record (or update) a day's snapshot
    Record {
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Hours slept
        #[arg(long)]
        sleep: Option<f64>,
        /// Step count
        #[arg(long)]
        steps: Option<u32>,
        /// Body battery (1-100 as synced; out-of-range values are kept raw)
        #[arg(long)]
        battery: Option<i32>,
        /// Stress level
        #[arg(long)]
        stress: Option<i32>,
        /// Workout type, e.g. "run"
        #[arg(long)]
        workout: Option<String>,
    },
    /// Classify one day's readings
    Classify {
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Analyze the recent sleep trend
    Trend,
    /// Show the warnings that clear the confidence gate today
    Warnings {
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: HealthAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let user = &config.user.id;
    let db = Database::open()?;

    match action {
        HealthAction::Record {
            date,
            sleep,
            steps,
            battery,
            stress,
            workout,
        } => {
            let date = parse_date(date.as_deref())?;
            let mut snapshot = db
                .health_on(user, date)?
                .unwrap_or_else(|| HealthSnapshot::new(date));
            if sleep.is_some() {
                snapshot.sleep_hours = sleep;
            }
            if steps.is_some() {
                snapshot.steps = steps;
            }
            if battery.is_some() {
                snapshot.body_battery = battery;
            }
            if stress.is_some() {
                snapshot.stress_level = stress;
            }
            if workout.is_some() {
                snapshot.workout_type = workout;
            }
            db.upsert_health(user, &snapshot)?;
            print_json(&snapshot)?;
        }
        HealthAction::Classify { date } => {
            let date = parse_date(date.as_deref())?;
            let snapshot = db.health_on(user, date)?;
            let sleep = classify_sleep(snapshot.as_ref(), &config.health);
            let battery = classify_body_battery(snapshot.as_ref(), &config.health);
            print_json(&serde_json::json!({
                "date": date,
                "sleep": sleep,
                "body_battery": battery,
            }))?;
        }
        HealthAction::Trend => {
            let history = db.recent_health(user, config.health.trend_window)?;
            let verdict = analyze_sleep_trend(&history, &config.health);
            println!("Sleep trend: {}", verdict.trend.label());
            print_json(&verdict)?;
        }
        HealthAction::Warnings { date } => {
            let date = parse_date(date.as_deref())?;
            let snapshot = db.health_on(user, date)?;
            let history = db.recent_health(user, config.health.trend_window)?;
            let warnings = generate_health_warnings(snapshot.as_ref(), &history, &config.health);
            print_json(&warnings)?;
        }
    }
    Ok(())
}
