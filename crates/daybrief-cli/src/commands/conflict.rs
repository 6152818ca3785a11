//! Pairwise conflict commands.

use clap::Subcommand;
use daybrief_core::storage::Config;
use daybrief_core::{check_conflict, resolve_conflict, Database, PlanningContext};

use super::common::{parse_instant, print_json};

#[derive(Subcommand)]
pub enum ConflictCmd {
    /// Check whether two items overlap in time
    Check {
        /// First item ID
        id_a: String,
        /// Second item ID
        id_b: String,
    },
    /// Resolve a conflicting pair and explain the outcome
    Resolve {
        /// First item ID
        id_a: String,
        /// Second item ID
        id_b: String,
        /// Evaluate priorities as of this instant (RFC 3339, default now)
        #[arg(long)]
        at: Option<String>,
        /// Resolve under conservation mode
        #[arg(long)]
        conservation: bool,
    },
}

pub fn run(action: ConflictCmd) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let user = &config.user.id;
    let db = Database::open()?;

    match action {
        ConflictCmd::Check { id_a, id_b } => {
            let a = db.get_item(user, &id_a)?.ok_or(format!("Item not found: {id_a}"))?;
            let b = db.get_item(user, &id_b)?.ok_or(format!("Item not found: {id_b}"))?;
            print_json(&serde_json::json!({
                "a": a.id,
                "b": b.id,
                "conflict": check_conflict(&a, &b),
            }))?;
        }
        ConflictCmd::Resolve {
            id_a,
            id_b,
            at,
            conservation,
        } => {
            let a = db.get_item(user, &id_a)?.ok_or(format!("Item not found: {id_a}"))?;
            let b = db.get_item(user, &id_b)?.ok_or(format!("Item not found: {id_b}"))?;
            let now = parse_instant(at.as_deref())?;
            let ctx = PlanningContext::new(now).with_conservation(conservation);
            let resolution = resolve_conflict(&a, &b, &ctx);
            println!(
                "{} wins ({}); {} -> {}",
                resolution.winner.title,
                resolution.reason.as_str(),
                resolution.loser.title,
                resolution.action.as_str()
            );
            print_json(&resolution)?;
        }
    }
    Ok(())
}
