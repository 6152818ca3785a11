//! Shared helpers for CLI commands.

use chrono::{DateTime, NaiveDate, Utc};

/// Parse an optional RFC 3339 instant, falling back to the wall clock.
/// The CLI is the one place that reads the real clock; the core always
/// receives "now" explicitly.
pub fn parse_instant(at: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match at {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .map_err(|e| format!("invalid instant '{s}': {e}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// Parse an optional YYYY-MM-DD date, falling back to today (UTC).
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(s.parse::<NaiveDate>().map_err(|e| format!("invalid date '{s}': {e}"))?),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
