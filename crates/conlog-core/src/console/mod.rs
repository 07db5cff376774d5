//! Interactive command console.
//!
//! ```text
//!            read_line            first token found
//!   Idle ───────────────▶ Reading ─────────────────▶ Queued
//!    ▲                       │ no match / empty        │
//!    └───────────────────────┴─────────────────────────┘
//!                                                      │ process_commands()
//!                                                      ▼
//!                                                  Draining (owner holds
//!                                                  exclusive access)
//! ```
//!
//! The reader thread only tokenizes and enqueues. Handlers run later, on
//! whichever thread calls [`LogContext::process_commands`](crate::LogContext::process_commands).

pub mod commands;
pub(crate) mod lock;
pub mod reader;
#[cfg(unix)]
pub mod signals;

pub use commands::{command, Command, QueuedCommand};
pub use reader::READER_THREAD_NAME;
#[cfg(unix)]
pub use signals::{CLOSE_SIGNALS, SIGNAL_THREAD_NAME};
