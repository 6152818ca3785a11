//! Item management commands.

use chrono::Utc;
use clap::Subcommand;
use daybrief_core::storage::Config;
use daybrief_core::{can_delegate, delegation_permissions, Database, Domain, EnergyLevel, PlanItem};
use uuid::Uuid;

use super::common::{parse_instant, print_json};

#[derive(Subcommand)]
pub enum ItemAction {
    /// Add a task or event
    Add {
        /// Item title
        title: String,
        /// Domain: family, health, immutable, urgent, work, personal, parking
        #[arg(long, default_value = "work")]
        domain: String,
        /// Comma-separated labels (a `family` label forces the item into the day)
        #[arg(long)]
        labels: Option<String>,
        /// Family commitment: always wins, always planned
        #[arg(long)]
        family_override: bool,
        /// Locked in place, cannot be rescheduled
        #[arg(long)]
        immutable: bool,
        /// Due instant (RFC 3339)
        #[arg(long)]
        due: Option<String>,
        /// Energy required: low, medium, high
        #[arg(long, default_value = "medium")]
        energy: String,
        /// Someone is blocked on this item
        #[arg(long)]
        waiting_dependency: bool,
        /// Effort units against the day's load budget
        #[arg(long, default_value = "10")]
        load: u32,
        /// Start instant (RFC 3339)
        #[arg(long)]
        start: Option<String>,
        /// End instant (RFC 3339)
        #[arg(long)]
        end: Option<String>,
    },
    /// List items
    List {
        /// Include completed items
        #[arg(long)]
        all: bool,
    },
    /// Mark an item done
    Done {
        /// Item ID
        id: String,
    },
    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },
    /// Show assistant delegation verdict for an item
    Delegation {
        /// Item ID
        id: String,
    },
}

pub fn run(action: ItemAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let user = &config.user.id;
    let db = Database::open()?;

    match action {
        ItemAction::Add {
            title,
            domain,
            labels,
            family_override,
            immutable,
            due,
            energy,
            waiting_dependency,
            load,
            start,
            end,
        } => {
            let mut item = PlanItem::new(Uuid::new_v4().to_string(), title, Utc::now())
                .with_domain(domain.parse::<Domain>()?)
                .with_energy(energy.parse::<EnergyLevel>()?)
                .with_load(load);
            item.labels = labels
                .map(|l| l.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default();
            item.family_override = family_override;
            item.immutable = immutable;
            item.has_waiting_dependency = waiting_dependency;
            if let Some(due) = due {
                item.due_date = Some(parse_instant(Some(&due))?);
            }
            if let Some(start) = start {
                item.start_time = Some(parse_instant(Some(&start))?);
            }
            if let Some(end) = end {
                item.end_time = Some(parse_instant(Some(&end))?);
            }

            db.upsert_item(user, &item)?;
            println!("Item created: {}", item.id);
            print_json(&item)?;
        }
        ItemAction::List { all } => {
            let items = if all {
                db.list_items(user)?
            } else {
                db.open_items(user)?
            };
            print_json(&items)?;
        }
        ItemAction::Done { id } => {
            if db.complete_item(user, &id, Utc::now())? {
                println!("Item completed: {id}");
            } else {
                println!("Item not found: {id}");
            }
        }
        ItemAction::Delete { id } => {
            if db.delete_item(user, &id)? {
                println!("Item deleted: {id}");
            } else {
                println!("Item not found: {id}");
            }
        }
        ItemAction::Delegation { id } => {
            match db.get_item(user, &id)? {
                Some(item) => {
                    let delegable = can_delegate(&item);
                    let permissions = delegable.then(|| delegation_permissions(&item));
                    print_json(&serde_json::json!({
                        "item": item.id,
                        "delegable": delegable,
                        "permissions": permissions,
                    }))?;
                }
                None => println!("Item not found: {id}"),
            }
        }
    }
    Ok(())
}
