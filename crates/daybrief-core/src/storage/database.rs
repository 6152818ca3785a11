//! SQLite-based storage for items, health data, briefs, and day-close
//! records.
//!
//! Briefs and day-close records are upserted once per day, keyed by
//! (user_id, date). The decision engine itself never touches this
//! module; only the CLI and the day-close session do.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::brief::DailyBrief;
use crate::day_close::{DayCloseRecord, DayCloseState, DayCloseStore, DayCloseSummary};
use crate::error::{CoreError, DatabaseError, Result};
use crate::health::HealthSnapshot;
use crate::item::{Domain, EnergyLevel, PlanItem};

/// SQLite database wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/daybrief/daybrief.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("daybrief.db");
        let conn = Connection::open(&path).map_err(|source| {
            CoreError::Database(DatabaseError::OpenFailed { path, source })
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests, dry runs).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Database(DatabaseError::from(e)))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open at an explicit path.
    pub fn open_at(path: std::path::PathBuf) -> Result<Self> {
        let conn = Connection::open(&path).map_err(|source| {
            CoreError::Database(DatabaseError::OpenFailed { path, source })
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS items (
                    id                     TEXT NOT NULL,
                    user_id                TEXT NOT NULL,
                    title                  TEXT NOT NULL,
                    domain                 TEXT NOT NULL,
                    labels                 TEXT NOT NULL DEFAULT '[]',
                    family_override        INTEGER NOT NULL DEFAULT 0,
                    immutable              INTEGER NOT NULL DEFAULT 0,
                    due_date               TEXT,
                    energy                 TEXT NOT NULL DEFAULT 'medium',
                    has_waiting_dependency INTEGER NOT NULL DEFAULT 0,
                    estimated_load         INTEGER NOT NULL DEFAULT 10,
                    start_time             TEXT,
                    end_time               TEXT,
                    completed              INTEGER NOT NULL DEFAULT 0,
                    completed_at           TEXT,
                    created_at             TEXT NOT NULL,
                    PRIMARY KEY (user_id, id)
                );

                CREATE TABLE IF NOT EXISTS health_data (
                    user_id      TEXT NOT NULL,
                    date         TEXT NOT NULL,
                    sleep_hours  REAL,
                    steps        INTEGER,
                    body_battery INTEGER,
                    stress_level INTEGER,
                    workout_type TEXT,
                    PRIMARY KEY (user_id, date)
                );

                CREATE TABLE IF NOT EXISTS daily_briefs (
                    user_id TEXT NOT NULL,
                    date    TEXT NOT NULL,
                    brief   TEXT NOT NULL,
                    PRIMARY KEY (user_id, date)
                );

                CREATE TABLE IF NOT EXISTS day_close (
                    user_id       TEXT NOT NULL,
                    date          TEXT NOT NULL,
                    state         TEXT NOT NULL,
                    summary       TEXT NOT NULL,
                    tomorrow_note TEXT,
                    closed_at     TEXT NOT NULL,
                    PRIMARY KEY (user_id, date)
                );

                CREATE INDEX IF NOT EXISTS idx_items_start_time ON items(start_time);
                CREATE INDEX IF NOT EXISTS idx_items_completed_at ON items(completed_at);
                ",
            )
            .map_err(|e| CoreError::Database(DatabaseError::MigrationFailed(e.to_string())))?;
        Ok(())
    }

    // ── Items ────────────────────────────────────────────────────────

    pub fn upsert_item(&self, user: &str, item: &PlanItem) -> Result<()> {
        let labels = serde_json::to_string(&item.labels)?;
        self.conn.execute(
            "INSERT INTO items (
                id, user_id, title, domain, labels, family_override, immutable,
                due_date, energy, has_waiting_dependency, estimated_load,
                start_time, end_time, completed, completed_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ON CONFLICT (user_id, id) DO UPDATE SET
                title = excluded.title,
                domain = excluded.domain,
                labels = excluded.labels,
                family_override = excluded.family_override,
                immutable = excluded.immutable,
                due_date = excluded.due_date,
                energy = excluded.energy,
                has_waiting_dependency = excluded.has_waiting_dependency,
                estimated_load = excluded.estimated_load,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                completed = excluded.completed,
                completed_at = excluded.completed_at",
            params![
                item.id,
                user,
                item.title,
                item.domain.as_str(),
                labels,
                item.family_override,
                item.immutable,
                item.due_date.map(|d| d.to_rfc3339()),
                item.energy.as_str(),
                item.has_waiting_dependency,
                item.estimated_load,
                item.start_time.map(|d| d.to_rfc3339()),
                item.end_time.map(|d| d.to_rfc3339()),
                item.completed,
                item.completed_at.map(|d| d.to_rfc3339()),
                item.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_item(&self, user: &str, id: &str) -> Result<Option<PlanItem>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ?1 AND id = ?2"),
                params![user, id],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    /// All items for the user, open items first, in creation order.
    pub fn list_items(&self, user: &str) -> Result<Vec<PlanItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ?1
             ORDER BY completed ASC, created_at ASC"
        ))?;
        let items = stmt
            .query_map(params![user], item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Open (not yet completed) items -- the brief generator's input pool.
    pub fn open_items(&self, user: &str) -> Result<Vec<PlanItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ?1 AND completed = 0
             ORDER BY created_at ASC"
        ))?;
        let items = stmt
            .query_map(params![user], item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Mark an item completed. Returns false if the item does not exist.
    pub fn complete_item(&self, user: &str, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE items SET completed = 1, completed_at = ?3
             WHERE user_id = ?1 AND id = ?2",
            params![user, id, at.to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_item(&self, user: &str, id: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM items WHERE user_id = ?1 AND id = ?2",
            params![user, id],
        )?;
        Ok(changed > 0)
    }

    /// Items completed on the given day.
    pub fn completed_items_on(&self, user: &str, date: NaiveDate) -> Result<Vec<PlanItem>> {
        let (start, end) = day_bounds(date);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE user_id = ?1 AND completed = 1
               AND completed_at >= ?2 AND completed_at < ?3
             ORDER BY completed_at ASC"
        ))?;
        let items = stmt
            .query_map(params![user, start, end], item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Timed items starting on the given day.
    pub fn timed_items_on(&self, user: &str, date: NaiveDate) -> Result<Vec<PlanItem>> {
        let (start, end) = day_bounds(date);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE user_id = ?1 AND start_time >= ?2 AND start_time < ?3
             ORDER BY start_time ASC"
        ))?;
        let items = stmt
            .query_map(params![user, start, end], item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    // ── Health ───────────────────────────────────────────────────────

    pub fn upsert_health(&self, user: &str, snapshot: &HealthSnapshot) -> Result<()> {
        self.conn.execute(
            "INSERT INTO health_data (
                user_id, date, sleep_hours, steps, body_battery, stress_level, workout_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (user_id, date) DO UPDATE SET
                sleep_hours = excluded.sleep_hours,
                steps = excluded.steps,
                body_battery = excluded.body_battery,
                stress_level = excluded.stress_level,
                workout_type = excluded.workout_type",
            params![
                user,
                snapshot.date.to_string(),
                snapshot.sleep_hours,
                snapshot.steps,
                snapshot.body_battery,
                snapshot.stress_level,
                snapshot.workout_type,
            ],
        )?;
        Ok(())
    }

    /// Most recent snapshots, newest first -- the shape the trend
    /// analyzer expects.
    pub fn recent_health(&self, user: &str, limit: usize) -> Result<Vec<HealthSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, sleep_hours, steps, body_battery, stress_level, workout_type
             FROM health_data WHERE user_id = ?1
             ORDER BY date DESC LIMIT ?2",
        )?;
        let snapshots = stmt
            .query_map(params![user, limit as i64], health_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(snapshots)
    }

    pub fn health_on(&self, user: &str, date: NaiveDate) -> Result<Option<HealthSnapshot>> {
        let snapshot = self
            .conn
            .query_row(
                "SELECT date, sleep_hours, steps, body_battery, stress_level, workout_type
                 FROM health_data WHERE user_id = ?1 AND date = ?2",
                params![user, date.to_string()],
                health_from_row,
            )
            .optional()?;
        Ok(snapshot)
    }

    // ── Briefs ───────────────────────────────────────────────────────

    pub fn upsert_brief(&self, user: &str, date: NaiveDate, brief: &DailyBrief) -> Result<()> {
        let json = serde_json::to_string(brief)?;
        self.conn.execute(
            "INSERT INTO daily_briefs (user_id, date, brief) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, date) DO UPDATE SET brief = excluded.brief",
            params![user, date.to_string(), json],
        )?;
        Ok(())
    }

    pub fn load_brief(&self, user: &str, date: NaiveDate) -> Result<Option<DailyBrief>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT brief FROM daily_briefs WHERE user_id = ?1 AND date = ?2",
                params![user, date.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl DayCloseStore for Database {
    fn load_day_close(&self, user: &str, date: NaiveDate) -> Result<Option<DayCloseRecord>, CoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT state, summary, tomorrow_note, closed_at
                 FROM day_close WHERE user_id = ?1 AND date = ?2",
                params![user, date.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((state, summary, tomorrow_note, closed_at)) = row else {
            return Ok(None);
        };
        let state: DayCloseState = state
            .parse()
            .map_err(|e: String| CoreError::Database(DatabaseError::QueryFailed(e)))?;
        let summary: DayCloseSummary = serde_json::from_str(&summary)?;
        let closed_at = parse_rfc3339(&closed_at)?;
        Ok(Some(DayCloseRecord {
            user_id: user.to_string(),
            date,
            state,
            summary,
            tomorrow_note,
            closed_at,
        }))
    }

    fn upsert_day_close(&self, record: &DayCloseRecord) -> Result<(), CoreError> {
        let summary = serde_json::to_string(&record.summary)?;
        self.conn.execute(
            "INSERT INTO day_close (user_id, date, state, summary, tomorrow_note, closed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (user_id, date) DO UPDATE SET
                state = excluded.state,
                summary = excluded.summary,
                tomorrow_note = excluded.tomorrow_note,
                closed_at = excluded.closed_at",
            params![
                record.user_id,
                record.date.to_string(),
                record.state.as_str(),
                summary,
                record.tomorrow_note,
                record.closed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

const ITEM_COLUMNS: &str = "id, title, domain, labels, family_override, immutable, due_date, \
     energy, has_waiting_dependency, estimated_load, start_time, end_time, \
     completed, completed_at, created_at";

fn day_bounds(date: NaiveDate) -> (String, String) {
    let next = date.succ_opt().unwrap_or(date);
    (
        format!("{date}T00:00:00+00:00"),
        format!("{next}T00:00:00+00:00"),
    )
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| CoreError::Database(DatabaseError::QueryFailed(e.to_string())))
}

fn conversion_error(err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn opt_datetime(value: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(conversion_error)
        })
        .transpose()
}

fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlanItem> {
    let labels: String = row.get(3)?;
    let domain: String = row.get(2)?;
    let energy: String = row.get(7)?;
    Ok(PlanItem {
        id: row.get(0)?,
        title: row.get(1)?,
        domain: domain
            .parse::<Domain>()
            .map_err(|e| conversion_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?,
        labels: serde_json::from_str(&labels).map_err(conversion_error)?,
        family_override: row.get(4)?,
        immutable: row.get(5)?,
        due_date: opt_datetime(row.get(6)?)?,
        energy: energy
            .parse::<EnergyLevel>()
            .map_err(|e| conversion_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?,
        has_waiting_dependency: row.get(8)?,
        estimated_load: row.get(9)?,
        start_time: opt_datetime(row.get(10)?)?,
        end_time: opt_datetime(row.get(11)?)?,
        completed: row.get(12)?,
        completed_at: opt_datetime(row.get(13)?)?,
        created_at: {
            let created: String = row.get(14)?;
            DateTime::parse_from_rfc3339(&created)
                .map(|d| d.with_timezone(&Utc))
                .map_err(conversion_error)?
        },
    })
}

fn health_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HealthSnapshot> {
    let date: String = row.get(0)?;
    Ok(HealthSnapshot {
        date: date
            .parse::<NaiveDate>()
            .map_err(conversion_error)?,
        sleep_hours: row.get(1)?,
        steps: row.get(2)?,
        body_battery: row.get(3)?,
        stress_level: row.get(4)?,
        workout_type: row.get(5)?,
    })
}
