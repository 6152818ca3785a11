//! Day-close commands.
//!
//! A CLI process cannot hold the auto-close timer across invocations,
//! so `close start` runs the tick loop in-process: it prints the
//! summary, then waits out the 30-second window (unless interrupted by
//! running `close ack`/`close review` from another terminal first --
//! whichever write lands first wins the day's record).

use chrono::Utc;
use clap::Subcommand;
use daybrief_core::storage::Config;
use daybrief_core::{Database, DayCloseInput, DayCloseSession, DayCloseState, DayCloseStore};

use super::common::print_json;

#[derive(Subcommand)]
pub enum CloseAction {
    /// Open the day-close flow: print the summary, then auto-close
    /// silently if nothing happens within the window
    Start {
        /// The morning anchor ritual was completed today
        #[arg(long)]
        anchor_done: bool,
        /// Print the summary and exit without waiting for the auto-close
        #[arg(long)]
        no_wait: bool,
    },
    /// Acknowledge the summary ("got it")
    Ack {
        /// The morning anchor ritual was completed today
        #[arg(long)]
        anchor_done: bool,
    },
    /// Review the day and confirm, optionally noting one thing for tomorrow
    Review {
        /// Note for tomorrow
        #[arg(long)]
        note: Option<String>,
        /// The morning anchor ritual was completed today
        #[arg(long)]
        anchor_done: bool,
    },
    /// Show the day's close record, if any
    Status,
}

fn open_session(
    db: &Database,
    config: &Config,
    anchor_done: bool,
) -> Result<DayCloseSession, Box<dyn std::error::Error>> {
    let user = &config.user.id;
    let now = Utc::now();
    let date = now.date_naive();
    let completed = db.completed_items_on(user, date)?;
    let events = db.timed_items_on(user, date)?;
    let health = db.health_on(user, date)?;
    let input = DayCloseInput {
        completed_tasks: &completed,
        events: &events,
        health: health.as_ref(),
        morning_anchor_done: anchor_done,
        now,
    };
    let (session, _) = DayCloseSession::open(
        db,
        user.clone(),
        date,
        &input,
        config.day_close.step_goal,
        config.day_close.auto_close_secs,
    )?;
    Ok(session)
}

pub fn run(action: CloseAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        CloseAction::Start { anchor_done, no_wait } => {
            let mut session = open_session(&db, &config, anchor_done)?;
            print_json(session.summary())?;

            if session.state() != DayCloseState::Auto {
                println!("Day already closed ({}).", session.state().as_str());
                return Ok(());
            }
            if no_wait {
                println!("Auto-close skipped; run `daybrief close ack` or `review` to finish.");
                return Ok(());
            }

            println!(
                "Day will auto-close in {}s...",
                config.day_close.auto_close_secs
            );
            loop {
                std::thread::sleep(std::time::Duration::from_secs(1));
                if let Some(event) = session.tick(&db, Utc::now())? {
                    log::info!("{}", serde_json::to_string(&event)?);
                    println!("Day closed. Good night.");
                    break;
                }
            }
        }
        CloseAction::Ack { anchor_done } => {
            let mut session = open_session(&db, &config, anchor_done)?;
            if session.state() != DayCloseState::Auto {
                println!("Day already closed ({}).", session.state().as_str());
                return Ok(());
            }
            session.acknowledge(&db, Utc::now())?;
            session.close()?;
            println!("Day closed ({}).", DayCloseState::Partial.as_str());
        }
        CloseAction::Review { note, anchor_done } => {
            let mut session = open_session(&db, &config, anchor_done)?;
            if session.state() != DayCloseState::Auto {
                println!("Day already closed ({}).", session.state().as_str());
                return Ok(());
            }
            session.review(&db, note, Utc::now())?;
            session.close()?;
            println!("Day closed ({}).", DayCloseState::Reviewed.as_str());
        }
        CloseAction::Status => {
            let user = &config.user.id;
            let date = Utc::now().date_naive();
            match db.load_day_close(user, date)? {
                Some(record) => print_json(&record)?,
                None => println!("No day-close record for {date}."),
            }
        }
    }
    Ok(())
}
