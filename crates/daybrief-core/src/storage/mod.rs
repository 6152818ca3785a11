mod config;
pub mod database;

pub use config::{Config, DayCloseConfig, UserConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Returns `~/.config/daybrief[-dev]/` based on DAYBRIEF_ENV.
///
/// Set DAYBRIEF_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAYBRIEF_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("daybrief-dev")
    } else {
        base_dir.join("daybrief")
    };

    std::fs::create_dir_all(&dir).map_err(CoreError::Io)?;
    Ok(dir)
}
