//! TOML-based application configuration.
//!
//! Stores the user id and every tunable threshold the engine reads:
//! load budgets, health confidence bounds, day-close knobs.
//!
//! Configuration is stored at `~/.config/daybrief/config.toml`. There is
//! deliberately no implicit user: callers read `config.user.id` and pass
//! it into every storage call, so a second tenant or a test fixture is a
//! config change, not a code change.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::brief::BriefConfig;
use crate::error::{ConfigError, CoreError, Result};
use crate::health::HealthThresholds;

/// The single user this installation plans for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

fn default_user_id() -> String {
    "default".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// Day-close tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DayCloseConfig {
    /// Seconds of inactivity before the silent auto-close fires.
    #[serde(default = "default_auto_close_secs")]
    pub auto_close_secs: i64,
    /// Daily step count that earns a closure.
    #[serde(default = "default_step_goal")]
    pub step_goal: u32,
}

fn default_auto_close_secs() -> i64 {
    30
}
fn default_step_goal() -> u32 {
    5_000
}

impl Default for DayCloseConfig {
    fn default() -> Self {
        Self {
            auto_close_secs: default_auto_close_secs(),
            step_goal: default_step_goal(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/daybrief/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub planning: BriefConfig,
    #[serde(default)]
    pub health: HealthThresholds,
    #[serde(default)]
    pub day_close: DayCloseConfig,
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    CoreError::Config(ConfigError::LoadFailed {
                        path,
                        message: e.to_string(),
                    })
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| {
            CoreError::Config(ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })
        })?;
        std::fs::write(&path, content).map_err(|e| {
            CoreError::Config(ConfigError::SaveFailed {
                path,
                message: e.to_string(),
            })
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. Errors on unknown keys or
    /// unparsable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    fn invalid(key: &str, message: impl Into<String>) -> CoreError {
        CoreError::Config(ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        })
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(Self::invalid(key, "config key is empty"));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| Self::invalid(key, "unknown config key"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| Self::invalid(key, "unknown config key"))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| Self::invalid(key, e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    Self::invalid(key, format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(Self::invalid(
                                key,
                                format!("cannot parse '{value}' as number"),
                            ));
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| Self::invalid(key, "unknown config key"))?;
        }

        Err(Self::invalid(key, "unknown config key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let cfg = Config::default();
        assert_eq!(cfg.planning.max_load, 80);
        assert_eq!(cfg.planning.conservation_max_load, 60);
        assert_eq!(cfg.health.trend_window, 5);
        assert_eq!(cfg.health.warning_confidence_floor, 75);
        assert_eq!(cfg.day_close.auto_close_secs, 30);
        assert_eq!(cfg.day_close.step_goal, 5_000);
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let mut cfg = Config::default();
        cfg.user.id = "dan".to_string();
        cfg.planning.max_load = 70;

        let toml = toml::to_string_pretty(&cfg).unwrap();
        let decoded: Config = toml::from_str(&toml).unwrap();
        assert_eq!(decoded.user.id, "dan");
        assert_eq!(decoded.planning.max_load, 70);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let decoded: Config = toml::from_str("[user]\nid = \"dan\"\n").unwrap();
        assert_eq!(decoded.user.id, "dan");
        assert_eq!(decoded.planning.max_load, 80);
        assert_eq!(decoded.health.sleep_max_hours, 14.0);
    }

    #[test]
    fn dot_path_get_reads_nested_values() {
        let cfg = Config::default();
        assert_eq!(cfg.get("planning.max_load").as_deref(), Some("80"));
        assert_eq!(cfg.get("user.id").as_deref(), Some("default"));
        assert!(cfg.get("planning.nope").is_none());
    }
}
