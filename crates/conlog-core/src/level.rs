//! Severity levels and their fixed-width console labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

/// ANSI sequence restoring the terminal's default attributes.
pub const ANSI_RESET: &str = "\x1b[0m";

/// Severity of a log record.
///
/// Ordering follows declaration order and is the only thing the minimum
/// level filter looks at: a record is written when `level >= minimum`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    #[default]
    Debug,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// All levels from least to most severe.
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    /// Seven-character label shown between brackets at the start of a record.
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => " Info  ",
            LogLevel::Debug => " Debug ",
            LogLevel::Warning => "Warning",
            LogLevel::Error => " Error ",
        }
    }

    /// Inverse of [`label`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label)
    }

    /// Foreground color used when colored output is enabled.
    pub fn ansi_color(self) -> &'static str {
        match self {
            LogLevel::Info => "\x1b[36m",
            LogLevel::Debug => "\x1b[32m",
            LogLevel::Warning => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConsoleError::InvalidLevel(s.to_string())),
        }
    }
}
