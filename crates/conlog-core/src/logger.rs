//! Leveled logger engine.
//!
//! Every loggable type owns exactly one [`Logger`], created in its
//! constructor and dropped with it:
//!
//! ```ignore
//! use std::sync::Arc;
//! use conlog_core::{log_info, LogContext, Loggable, Logger};
//!
//! struct AssetCache {
//!     logger: Logger,
//! }
//!
//! impl Loggable for AssetCache {
//!     const TYPE_NAME: &'static str = "AssetCache";
//!
//!     fn logger(&self) -> &Logger {
//!         &self.logger
//!     }
//! }
//!
//! impl AssetCache {
//!     fn new(ctx: &Arc<LogContext>) -> Self {
//!         Self { logger: Logger::named::<Self>(ctx, "textures") }
//!     }
//! }
//!
//! let cache = AssetCache::new(LogContext::global());
//! log_info!(cache, "Loaded ", 12, " textures from ", path.display());
//! ```

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::context::LogContext;
use crate::format::concat_parts;
use crate::level::LogLevel;
use crate::registry::InstanceId;

/// A long-lived object that writes leveled records under its own type label.
pub trait Loggable {
    /// Label shown in the padded type column.
    const TYPE_NAME: &'static str;

    /// The logger bound to this instance.
    fn logger(&self) -> &Logger;

    /// Instance name given at construction, if any.
    fn instance_name(&self) -> Option<&str> {
        self.logger().name()
    }

    fn instance_id(&self) -> InstanceId {
        self.logger().id()
    }

    fn log(&self, level: LogLevel, parts: &[&dyn Display]) {
        self.logger().log(level, parts);
    }

    fn log_info(&self, parts: &[&dyn Display]) {
        self.logger().log(LogLevel::Info, parts);
    }

    fn log_debug(&self, parts: &[&dyn Display]) {
        self.logger().log(LogLevel::Debug, parts);
    }

    fn log_warning(&self, parts: &[&dyn Display]) {
        self.logger().log(LogLevel::Warning, parts);
    }

    fn log_error(&self, parts: &[&dyn Display]) {
        self.logger().log(LogLevel::Error, parts);
    }
}

/// Per-instance logging handle.
///
/// Holds the instance's display metadata and a reference to the shared
/// [`LogContext`]. Not `Clone`: one instance, one logger.
pub struct Logger {
    ctx: Arc<LogContext>,
    type_name: &'static str,
    name: Option<String>,
    id: InstanceId,
}

impl Logger {
    /// Logger for an unnamed instance of `T`.
    pub fn new<T: Loggable>(ctx: &Arc<LogContext>) -> Self {
        Self::with_type_name(ctx, T::TYPE_NAME, None)
    }

    /// Logger for an instance of `T` called `name`.
    pub fn named<T: Loggable>(ctx: &Arc<LogContext>, name: impl Into<String>) -> Self {
        Self::with_type_name(ctx, T::TYPE_NAME, Some(name.into()))
    }

    /// Logger with an explicit type label, for types whose label is only known at runtime.
    pub fn with_type_name(
        ctx: &Arc<LogContext>,
        type_name: &'static str,
        name: Option<String>,
    ) -> Self {
        let id = ctx.register_instance(type_name);
        Self {
            ctx: Arc::clone(ctx),
            type_name,
            name: name.filter(|name| !name.is_empty()),
            id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn context(&self) -> &Arc<LogContext> {
        &self.ctx
    }

    /// Whether a record at `level` would currently be written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.ctx.is_enabled(level)
    }

    /// Write one record whose payload is the concatenation of `parts`.
    ///
    /// Below the context's minimum level this writes nothing, prompt included.
    pub fn log(&self, level: LogLevel, parts: &[&dyn Display]) {
        if !self.enabled(level) {
            return;
        }
        let payload = concat_parts(parts);
        self.emit(level, &payload);
    }

    /// Write one record from preformatted arguments.
    pub fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let payload = fmt::format(args);
        self.emit(level, &payload);
    }

    pub fn info(&self, parts: &[&dyn Display]) {
        self.log(LogLevel::Info, parts);
    }

    pub fn debug(&self, parts: &[&dyn Display]) {
        self.log(LogLevel::Debug, parts);
    }

    pub fn warning(&self, parts: &[&dyn Display]) {
        self.log(LogLevel::Warning, parts);
    }

    pub fn error(&self, parts: &[&dyn Display]) {
        self.log(LogLevel::Error, parts);
    }

    fn emit(&self, level: LogLevel, payload: &str) {
        self.ctx
            .write_record(level, self.type_name, self.name(), self.id, payload);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}

/// Log at an explicit level: `log_at!(target, level, part, part, ...)`.
///
/// `target` is a [`Logger`] or anything implementing [`Loggable`]. Each part
/// only needs to implement `Display`.
#[macro_export]
macro_rules! log_at {
    ($target:expr, $level:expr, $($part:expr),+ $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::Loggable as _;
        ($target).log($level, &[$(&$part as &dyn ::core::fmt::Display),+])
    }};
}

/// Log at [`LogLevel::Info`](crate::LogLevel::Info).
#[macro_export]
macro_rules! log_info {
    ($target:expr, $($part:expr),+ $(,)?) => {
        $crate::log_at!($target, $crate::LogLevel::Info, $($part),+)
    };
}

/// Log at [`LogLevel::Debug`](crate::LogLevel::Debug).
#[macro_export]
macro_rules! log_debug {
    ($target:expr, $($part:expr),+ $(,)?) => {
        $crate::log_at!($target, $crate::LogLevel::Debug, $($part),+)
    };
}

/// Log at [`LogLevel::Warning`](crate::LogLevel::Warning).
#[macro_export]
macro_rules! log_warning {
    ($target:expr, $($part:expr),+ $(,)?) => {
        $crate::log_at!($target, $crate::LogLevel::Warning, $($part),+)
    };
}

/// Log at [`LogLevel::Error`](crate::LogLevel::Error).
#[macro_export]
macro_rules! log_error {
    ($target:expr, $($part:expr),+ $(,)?) => {
        $crate::log_at!($target, $crate::LogLevel::Error, $($part),+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::format::parse_record;
    use crate::sink::MemorySink;

    struct Widget {
        logger: Logger,
    }

    impl Loggable for Widget {
        const TYPE_NAME: &'static str = "Widget";

        fn logger(&self) -> &Logger {
            &self.logger
        }
    }

    fn context() -> (Arc<LogContext>, MemorySink) {
        let sink = MemorySink::new();
        let config = ConsoleConfig::default()
            .with_console_title(None)
            .with_min_level(LogLevel::Info);
        (LogContext::with_sink(config, sink.clone()), sink)
    }

    #[test]
    fn test_macro_with_loggable_and_logger() {
        let (ctx, sink) = context();
        let widget = Widget {
            logger: Logger::named::<Widget>(&ctx, "left"),
        };

        log_info!(widget, "count=", 3);
        log_error!(widget.logger(), "failed: ", "disk full");

        let output = sink.contents();
        let records: Vec<_> = output.lines().filter_map(parse_record).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[0].payload, "count=3");
        assert_eq!(records[0].instance_name.as_deref(), Some("left"));
        assert_eq!(records[1].level, LogLevel::Error);
        assert_eq!(records[1].payload, "failed: disk full");
    }

    #[test]
    fn test_log_fmt() {
        let (ctx, sink) = context();
        let logger = Logger::new::<Widget>(&ctx);
        logger.log_fmt(LogLevel::Warning, format_args!("{:>4}|", 7));

        let record = parse_record(sink.contents().trim_end()).unwrap();
        assert_eq!(record.payload, "   7|");
        assert_eq!(record.instance_name, None);
    }

    #[test]
    fn test_filtered_writes_nothing() {
        let (ctx, sink) = context();
        ctx.set_min_level(LogLevel::Warning);
        let logger = Logger::new::<Widget>(&ctx);

        logger.info(&[&"x"]);
        logger.debug(&[&"x"]);
        assert!(sink.is_empty());

        logger.warning(&[&"x"]);
        assert!(!sink.is_empty());
    }

    #[test]
    fn test_empty_name_is_none() {
        let (ctx, _sink) = context();
        let logger = Logger::named::<Widget>(&ctx, "");
        assert_eq!(logger.name(), None);
    }

    #[test]
    fn test_record_ends_with_newline_and_prompt() {
        let (ctx, sink) = context();
        let logger = Logger::new::<Widget>(&ctx);

        logger.info(&[&"before"]);
        assert!(sink.take().ends_with(": before\n"));

        ctx.add_commands([("noop", crate::command(|_| {}))]);
        logger.info(&[&"after"]);
        assert!(sink.take().ends_with(": after\n > "));
    }
}
