//! Focus selection commands.

use clap::Subcommand;
use daybrief_core::storage::Config;
use daybrief_core::{select_focus, Database, FocusState, PlanItem};

use super::common::{parse_instant, print_json};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Pick the current focus from today's brief
    Now {
        /// Evaluate as of this instant (RFC 3339, default now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show the full past/ongoing/upcoming/tasks breakdown
    State {
        /// Evaluate as of this instant (RFC 3339, default now)
        #[arg(long)]
        at: Option<String>,
    },
}

fn planned_items(
    db: &Database,
    user: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<PlanItem>, Box<dyn std::error::Error>> {
    // Prefer the persisted brief's plan; fall back to the raw open pool
    // when no brief was generated yet.
    if let Some(brief) = db.load_brief(user, now.date_naive())? {
        return Ok(brief
            .doing_today_structured
            .into_iter()
            .map(|e| e.item)
            .collect());
    }
    Ok(db.open_items(user)?)
}

pub fn run(action: FocusAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let user = &config.user.id;
    let db = Database::open()?;

    match action {
        FocusAction::Now { at } => {
            let now = parse_instant(at.as_deref())?;
            let items = planned_items(&db, user, now)?;
            match select_focus(&items, now) {
                Some(focus) => print_json(&focus)?,
                None => println!("No current focus -- the day is clear."),
            }
        }
        FocusAction::State { at } => {
            let now = parse_instant(at.as_deref())?;
            let items = planned_items(&db, user, now)?;
            print_json(&FocusState::compute(&items, now))?;
        }
    }
    Ok(())
}
