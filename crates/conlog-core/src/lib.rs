//! Conlog Core Library
//!
//! Leveled console logging with an interactive command console.
//!
//! ## Overview
//!
//! Long-lived objects implement [`Loggable`] and own a [`Logger`]. Each
//! record is written as one line to the context's sink, with the type label
//! padded to the widest type registered so far. When commands are
//! registered, a background reader thread queues matching input lines and a
//! host thread runs them with [`LogContext::process_commands`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use conlog_core::{command, log_info, LogContext, ConsoleConfig, Logger};
//!
//! struct App;
//! impl conlog_core::Loggable for App { /* ... */ }
//!
//! let ctx = LogContext::install_global(ConsoleConfig::from_env())?;
//! ctx.add_commands([("reset", command(|args| println!("reset {:?}", args)))]);
//!
//! let logger = Logger::named::<App>(ctx, "main");
//! log_info!(logger, "Started with ", 3, " workers");
//!
//! loop {
//!     ctx.process_commands();
//!     // ... frame work ...
//! }
//! ```

pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod registry;
pub mod sink;
pub mod thread;
pub mod utils;

// Re-exports
pub use config::ConsoleConfig;
pub use console::{command, Command, QueuedCommand, READER_THREAD_NAME};
pub use context::{CloseHandler, LogContext};
pub use error::{ConsoleError, ConsoleResult};
pub use format::{parse_record, render_record, ParsedRecord, RecordHeader, TIMESTAMP_FORMAT};
pub use level::LogLevel;
pub use logger::{Loggable, Logger};
pub use registry::{InstanceId, InstanceRegistry};
pub use sink::{BoxedSink, MemorySink};
pub use thread::LoggableThread;
pub use utils::fs::Resources;
