//! Console configuration.
//!
//! Values are layered: defaults, then an optional JSON file, then
//! `CONLOG_*` environment variables. Hosts apply their own command line
//! flags on top through the `with_*` builders.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, ConsoleResult};
use crate::level::LogLevel;

/// Environment variable overriding [`ConsoleConfig::min_level`].
pub const ENV_LEVEL: &str = "CONLOG_LEVEL";
/// Environment variable overriding [`ConsoleConfig::prompt`].
pub const ENV_PROMPT: &str = "CONLOG_PROMPT";
/// Environment variable overriding [`ConsoleConfig::console_title`]. Empty disables the title.
pub const ENV_TITLE: &str = "CONLOG_TITLE";
/// Environment variable overriding [`ConsoleConfig::color`].
pub const ENV_COLOR: &str = "CONLOG_COLOR";
/// Environment variable overriding [`ConsoleConfig::resource_dir`].
pub const ENV_RESOURCE_DIR: &str = "CONLOG_RESOURCE_DIR";
/// Environment variable overriding [`ConsoleConfig::close_on_signal`].
pub const ENV_CLOSE_ON_SIGNAL: &str = "CONLOG_CLOSE_ON_SIGNAL";

/// Settings for a [`LogContext`](crate::LogContext).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Records below this level are dropped
    pub min_level: LogLevel,

    /// Printed after each record and each input line while commands are registered
    pub prompt: String,

    /// Terminal title set when the console is first attached
    pub console_title: Option<String>,

    /// Wrap records in per-level ANSI colors
    pub color: bool,

    /// Root for resource lookups done by [`Resources`](crate::utils::fs::Resources)
    pub resource_dir: PathBuf,

    /// Close the console on SIGINT or SIGTERM once it is attached (unix only)
    pub close_on_signal: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::default(),
            prompt: " > ".to_string(),
            console_title: Some("Debug Console".to_string()),
            color: false,
            resource_dir: PathBuf::from("Data"),
            close_on_signal: true,
        }
    }
}

impl ConsoleConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply `CONLOG_*` variables from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_vars(std::env::vars())
    }

    /// Like [`apply_env`](Self::apply_env), but an unparseable value is an error.
    pub fn try_apply_env(self) -> ConsoleResult<Self> {
        self.try_apply_vars(std::env::vars())
    }

    /// Apply `CONLOG_*` overrides from an arbitrary set of variables.
    ///
    /// Unparseable values are skipped with a warning.
    pub fn apply_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            if let Err(e) = self.apply_var(key.as_ref(), value.into()) {
                tracing::warn!(error = %e, "Ignoring environment override");
            }
        }
        self
    }

    /// Apply `CONLOG_*` overrides, failing with [`ConsoleError::Config`] on
    /// the first unparseable value.
    pub fn try_apply_vars<I, K, V>(mut self, vars: I) -> ConsoleResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.apply_var(key.as_ref(), value.into())?;
        }
        Ok(self)
    }

    fn apply_var(&mut self, key: &str, value: String) -> ConsoleResult<()> {
        match key {
            ENV_LEVEL => {
                self.min_level = value
                    .parse()
                    .map_err(|e| ConsoleError::Config(format!("{}: {}", ENV_LEVEL, e)))?;
            }
            ENV_PROMPT => self.prompt = value,
            ENV_TITLE => {
                self.console_title = if value.is_empty() { None } else { Some(value) };
            }
            ENV_COLOR => self.color = parse_flag(ENV_COLOR, &value)?,
            ENV_RESOURCE_DIR => self.resource_dir = PathBuf::from(value),
            ENV_CLOSE_ON_SIGNAL => self.close_on_signal = parse_flag(ENV_CLOSE_ON_SIGNAL, &value)?,
            _ => {}
        }
        Ok(())
    }

    /// Set the minimum level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the prompt string.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set or clear the console title.
    pub fn with_console_title(mut self, title: Option<String>) -> Self {
        self.console_title = title;
        self
    }

    /// Enable or disable colored records.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Set the resource root.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    /// Enable or disable closing on SIGINT/SIGTERM.
    pub fn with_close_on_signal(mut self, enabled: bool) -> Self {
        self.close_on_signal = enabled;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> ConsoleResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConsoleError::Config(format!(
            "{}: expected a boolean, got {:?}",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert_eq!(config.prompt, " > ");
        assert_eq!(config.console_title.as_deref(), Some("Debug Console"));
        assert!(!config.color);
        assert!(config.close_on_signal);
    }

    #[test]
    fn test_apply_vars() {
        let config = ConsoleConfig::default().apply_vars([
            (ENV_LEVEL, "error"),
            (ENV_PROMPT, "$ "),
            (ENV_TITLE, ""),
            (ENV_COLOR, "yes"),
            (ENV_CLOSE_ON_SIGNAL, "off"),
            ("UNRELATED", "ignored"),
        ]);

        assert_eq!(config.min_level, LogLevel::Error);
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.console_title, None);
        assert!(config.color);
        assert!(!config.close_on_signal);
    }

    #[test]
    fn test_invalid_vars_keep_previous_values() {
        let config = ConsoleConfig::default()
            .apply_vars([(ENV_LEVEL, "shouty"), (ENV_COLOR, "maybe")]);

        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(!config.color);
    }

    #[test]
    fn test_try_apply_vars_rejects_invalid_values() {
        let err = ConsoleConfig::default()
            .try_apply_vars([(ENV_PROMPT, "$ "), (ENV_LEVEL, "shouty")])
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: CONLOG_LEVEL: Invalid log level: shouty"
        );

        let err = ConsoleConfig::default()
            .try_apply_vars([(ENV_COLOR, "maybe")])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: CONLOG_COLOR: expected a boolean, got \"maybe\""
        );

        let config = ConsoleConfig::default()
            .try_apply_vars([(ENV_LEVEL, "warn"), (ENV_COLOR, "1")])
            .unwrap();
        assert_eq!(config.min_level, LogLevel::Warning);
        assert!(config.color);
    }

    #[test]
    fn test_load_partial_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{ "min_level": "warning", "color": true }"#).unwrap();

        let config = ConsoleConfig::load(&path).unwrap();
        assert_eq!(config.min_level, LogLevel::Warning);
        assert!(config.color);
        assert_eq!(config.prompt, " > ");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ConsoleConfig::load(temp.path().join("absent.json"));
        assert!(matches!(result, Err(crate::ConsoleError::Io(_))));
    }
}
