//! Record rendering.
//!
//! A rendered record has the shape
//!
//! ```text
//! \r[<label>] (<DDMmmYYYY HH:MM:SS>) <type padded to width>( (<name>))? [0x<id>]: <payload>
//! ```
//!
//! The engine appends the newline and prompt. [`parse_record`] reverses the
//! rendering so output can be checked line by line.

use std::fmt::{self, Display, Write};

use chrono::{DateTime, Local, NaiveDateTime};

use crate::level::LogLevel;
use crate::registry::InstanceId;

/// strftime pattern for the record timestamp, e.g. `14Oct2026 09:41:07`.
pub const TIMESTAMP_FORMAT: &str = "%d%b%Y %H:%M:%S";

/// Everything in a record except the payload.
#[derive(Debug, Clone)]
pub struct RecordHeader<'a> {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub type_name: &'a str,
    pub width: usize,
    pub instance_name: Option<&'a str>,
    pub id: InstanceId,
}

impl Display for RecordHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\r[{}] ({}) {:<width$}",
            self.level.label(),
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.type_name,
            width = self.width
        )?;
        if let Some(name) = self.instance_name.filter(|name| !name.is_empty()) {
            write!(f, " ({})", name)?;
        }
        write!(f, " [{}]: ", self.id)
    }
}

/// Render a header and payload into one line (no trailing newline).
pub fn render_record(header: &RecordHeader<'_>, payload: &str) -> String {
    let mut out = String::with_capacity(48 + header.width + payload.len());
    let _ = write!(out, "{}{}", header, payload);
    out
}

/// Concatenate the textual forms of `parts` with no separator.
pub fn concat_parts(parts: &[&dyn Display]) -> String {
    let mut out = String::new();
    for part in parts {
        let _ = write!(out, "{}", part);
    }
    out
}

/// A record read back from console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub level: LogLevel,
    pub timestamp: NaiveDateTime,
    pub type_name: String,
    /// Width of the padded type-name field, including padding
    pub type_field_width: usize,
    pub instance_name: Option<String>,
    pub id: u64,
    pub payload: String,
}

/// Parse one rendered record.
///
/// Leading prompt text before the `\r` is skipped, so raw output split on
/// `'\n'` can be fed in directly. Returns `None` for anything that is not a
/// record.
pub fn parse_record(line: &str) -> Option<ParsedRecord> {
    let start = line.find("\r[")?;
    let rest = &line[start + 2..];

    let label = rest.get(..7)?;
    let level = LogLevel::from_label(label)?;
    let rest = rest.get(7..)?.strip_prefix("] (")?;

    let close = rest.find(") ")?;
    let timestamp = NaiveDateTime::parse_from_str(&rest[..close], TIMESTAMP_FORMAT).ok()?;
    let rest = &rest[close + 2..];

    let id_start = rest.find(" [0x")?;
    let head = &rest[..id_start];
    let rest = &rest[id_start + 4..];
    let id_end = rest.find("]: ")?;
    let id = u64::from_str_radix(&rest[..id_end], 16).ok()?;
    let payload = rest[id_end + 3..].trim_end_matches(['\r', '\n']).to_string();

    let type_end = head.find(' ').unwrap_or(head.len());
    let type_name = head[..type_end].to_string();
    if type_name.is_empty() {
        return None;
    }

    let tail = &head[type_end..];
    let (instance_name, type_field_width) = match tail.trim_start().strip_prefix('(') {
        Some(named) if named.ends_with(')') => {
            let name = &named[..named.len() - 1];
            // " (" + name + ")" follows the padded field
            let field = head.len() - name.len() - 3;
            (Some(name.to_string()), field)
        }
        _ => (None, head.len()),
    };

    Some(ParsedRecord {
        level,
        timestamp,
        type_name,
        type_field_width,
        instance_name,
        id,
        payload,
    })
}
