//! Daily brief commands.

use clap::Subcommand;
use daybrief_core::storage::Config;
use daybrief_core::{generate_daily_brief, BriefInputs, Database, Event};

use super::common::{parse_date, parse_instant, print_json};

#[derive(Subcommand)]
pub enum BriefAction {
    /// Generate today's brief from stored items and health history and
    /// upsert it for the day
    Generate {
        /// Plan as of this instant (RFC 3339, default now)
        #[arg(long)]
        at: Option<String>,
        /// Print without persisting
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the persisted brief for a day
    Show {
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: BriefAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let user = &config.user.id;
    let db = Database::open()?;

    match action {
        BriefAction::Generate { at, dry_run } => {
            let now = parse_instant(at.as_deref())?;
            let date = now.date_naive();

            let items = db.open_items(user)?;
            let health_today = db.health_on(user, date)?;
            let history = db.recent_health(user, config.health.trend_window)?;

            let brief = generate_daily_brief(
                &BriefInputs {
                    items: &items,
                    health_today: health_today.as_ref(),
                    health_history: &history,
                    now,
                },
                &config.health,
                &config.planning,
            );

            if !dry_run {
                db.upsert_brief(user, date, &brief)?;
                let event = Event::BriefGenerated {
                    date,
                    load_score: brief.load_score,
                    conservation_mode: brief.conservation_mode,
                    sleep_trend: brief.sleep_trend,
                    doing_count: brief.doing_today.len(),
                    deferred_count: brief.not_doing_today.len(),
                    at: now,
                };
                log::info!("{}", serde_json::to_string(&event)?);
            }
            print_json(&brief)?;
        }
        BriefAction::Show { date } => {
            let date = parse_date(date.as_deref())?;
            match db.load_brief(user, date)? {
                Some(brief) => print_json(&brief)?,
                None => println!("No brief for {date}"),
            }
        }
    }
    Ok(())
}
