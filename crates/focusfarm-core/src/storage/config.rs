//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Appearance (dark mode, accent color)
//! - Daily reminder settings
//! - Goal targets (hours per day/week/month)
//! - Backend endpoint and user id
//!
//! Stored at `~/.config/focusfarm/config.toml`. Local only: nothing here is
//! relied upon for cross-device consistency.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Appearance preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_dark_mode")]
    pub dark_mode: bool,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

/// Daily reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hour of day (0-23) for the reminder.
    #[serde(default = "default_reminder_hour")]
    pub hour: u32,
}

/// Goal targets in hours. Overrides for the ledger's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_daily_hours")]
    pub daily_hours: f64,
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours: f64,
    #[serde(default = "default_monthly_hours")]
    pub monthly_hours: f64,
}

/// Backend endpoint settings. The access token lives in the OS keyring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusfarm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub display_name: Option<String>,
}

// Default functions
fn default_dark_mode() -> bool {
    true
}
fn default_accent_color() -> String {
    "#4ade80".into()
}
fn default_true() -> bool {
    true
}
fn default_reminder_hour() -> u32 {
    20
}
fn default_daily_hours() -> f64 {
    6.0
}
fn default_weekly_hours() -> f64 {
    30.0
}
fn default_monthly_hours() -> f64 {
    120.0
}
fn default_base_url() -> String {
    "https://api.focusfarm.app/rest/v1".into()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            accent_color: default_accent_color(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: default_reminder_hour(),
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            daily_hours: default_daily_hours(),
            weekly_hours: default_weekly_hours(),
            monthly_hours: default_monthly_hours(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: None,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Save the configuration. Writes to a temp file then renames, so a
    /// crash mid-write never leaves a truncated config.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Set a value by dotted key (e.g. `goals.daily_hours`). The new value
    /// is parsed against the existing field's type and rejected before any
    /// mutation when it does not parse.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut root = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        set_json_path(&mut root, key, value)?;
        let updated: Config =
            serde_json::from_value(root).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, hours) in [
            ("goals.daily_hours", self.goals.daily_hours),
            ("goals.weekly_hours", self.goals.weekly_hours),
            ("goals.monthly_hours", self.goals.monthly_hours),
        ] {
            if !(hours > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "goal target must be a positive number of hours".to_string(),
                });
            }
        }
        if self.reminders.hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "reminders.hour".to_string(),
                message: "hour must be 0-23".to_string(),
            });
        }
        Ok(())
    }
}

fn set_json_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a boolean")))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        let n = value
                            .parse::<f64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as a number")))?;
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as a number")))?
                    }
                }
                serde_json::Value::String(_) | serde_json::Value::Null => {
                    serde_json::Value::String(value.to_string())
                }
                _ => return Err(invalid("key does not hold a settable value".to_string())),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        } else {
            current = current
                .as_object_mut()
                .ok_or_else(unknown)?
                .get_mut(part)
                .ok_or_else(unknown)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.ui.dark_mode);
        assert_eq!(config.goals.daily_hours, 6.0);
        assert_eq!(config.reminders.hour, 20);
        assert!(config.backend.user_id.is_none());
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.goals.weekly_hours, 30.0);
        assert!(config.reminders.enabled);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.display_name = Some("Robin".into());
        config.goals.daily_hours = 4.5;
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.display_name.as_deref(), Some("Robin"));
        assert_eq!(parsed.goals.daily_hours, 4.5);
    }

    #[test]
    fn set_value_by_dotted_key() {
        let mut config = Config::default();
        config.set_value("ui.dark_mode", "false").unwrap();
        assert!(!config.ui.dark_mode);
        config.set_value("goals.daily_hours", "2.5").unwrap();
        assert_eq!(config.goals.daily_hours, 2.5);
        config.set_value("display_name", "Kim").unwrap();
        assert_eq!(config.display_name.as_deref(), Some("Kim"));
    }

    #[test]
    fn non_numeric_goal_is_rejected_without_mutation() {
        let mut config = Config::default();
        let err = config.set_value("goals.daily_hours", "six").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config.goals.daily_hours, 6.0);
    }

    #[test]
    fn zero_goal_is_rejected() {
        let mut config = Config::default();
        assert!(config.set_value("goals.weekly_hours", "0").is_err());
        assert_eq!(config.goals.weekly_hours, 30.0);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_value("ui.font_size", "12"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
