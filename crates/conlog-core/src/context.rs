//! Shared logging state for one console.
//!
//! A [`LogContext`] bundles everything the loggers and the command console
//! share: minimum level, command table and queue, column width, drain
//! ownership, the close hook and the output sink. Every [`Logger`](crate::Logger)
//! is constructed from an `Arc<LogContext>`.
//!
//! ## Locking
//!
//! ```text
//! exclusive   held per record, or across a whole drain (owner token)
//!   ├── commands   table + queue; lookup, enqueue, merge, snapshot only
//!   └── sink       one write_all + flush
//! min_level   RwLock, never held across other locks
//! registry    atomics only
//! ```
//!
//! Handlers never run with `commands` or `sink` held, so a handler may log,
//! register commands or change the level freely.
//!
//! ## Closing
//!
//! Attaching the console also starts a watcher for SIGINT and SIGTERM on
//! unix (unless [`ConsoleConfig::close_on_signal`] is off). The watcher runs
//! [`LogContext::close`] before the signal takes the process down, which is
//! the only way the close hook runs for the process-wide context.
//!
//! ## Process-wide context
//!
//! [`LogContext::global`] and [`LogContext::install_global`] create one
//! context for the whole process, at most once, and start a reader on
//! stdin. That reader is detached and abandoned when the process exits.

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once, OnceLock, Weak};
use std::thread::JoinHandle;

use chrono::Local;
use parking_lot::{Mutex, RwLock};

use crate::config::ConsoleConfig;
use crate::console::commands::{Command, CommandState};
use crate::console::lock::ExclusiveLock;
use crate::console::reader;
#[cfg(unix)]
use crate::console::signals::{AfterClose, SignalWatcher, CLOSE_SIGNALS};
use crate::error::{ConsoleError, ConsoleResult};
use crate::format::{render_record, RecordHeader};
use crate::level::{LogLevel, ANSI_RESET};
use crate::registry::{InstanceId, InstanceRegistry};
use crate::sink::BoxedSink;
use crate::utils::tokenize;

/// Callback run once when the console or process is closing.
pub type CloseHandler = Box<dyn FnOnce() + Send>;

static GLOBAL: OnceLock<Arc<LogContext>> = OnceLock::new();

pub struct LogContext {
    this: Weak<LogContext>,
    config: ConsoleConfig,
    min_level: RwLock<LogLevel>,
    registry: InstanceRegistry,
    commands: Mutex<CommandState>,
    has_commands: AtomicBool,
    attach: Once,
    exclusive: ExclusiveLock,
    sink: Mutex<BoxedSink>,
    on_close: Mutex<Option<CloseHandler>>,
    close_handler_set: AtomicBool,
    closed: AtomicBool,
    #[cfg(unix)]
    signals: Mutex<Option<SignalWatcher>>,
}

impl LogContext {
    /// Create a context writing to stdout. No reader is started.
    pub fn new(config: ConsoleConfig) -> Arc<Self> {
        Self::with_sink(config, io::stdout())
    }

    /// Create a context writing to `sink`. No reader is started.
    pub fn with_sink<W>(config: ConsoleConfig, sink: W) -> Arc<Self>
    where
        W: Write + Send + 'static,
    {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            min_level: RwLock::new(config.min_level),
            config,
            registry: InstanceRegistry::new(),
            commands: Mutex::new(CommandState::default()),
            has_commands: AtomicBool::new(false),
            attach: Once::new(),
            exclusive: ExclusiveLock::new(),
            sink: Mutex::new(Box::new(sink)),
            on_close: Mutex::new(None),
            close_handler_set: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            #[cfg(unix)]
            signals: Mutex::new(None),
        })
    }

    /// The process-wide context, created on first use from
    /// [`ConsoleConfig::from_env`] with a stdin reader running.
    pub fn global() -> &'static Arc<LogContext> {
        GLOBAL.get_or_init(|| Self::start_global(ConsoleConfig::from_env()))
    }

    /// Create the process-wide context from `config`.
    ///
    /// Fails with [`ConsoleError::AlreadyInitialized`] if [`global`](Self::global)
    /// or this function already ran.
    pub fn install_global(config: ConsoleConfig) -> ConsoleResult<&'static Arc<LogContext>> {
        let mut installed = false;
        let ctx = GLOBAL.get_or_init(|| {
            installed = true;
            Self::start_global(config)
        });
        if installed {
            Ok(ctx)
        } else {
            Err(ConsoleError::AlreadyInitialized)
        }
    }

    fn start_global(config: ConsoleConfig) -> Arc<LogContext> {
        let ctx = Self::new(config);
        if let Err(e) = ctx.spawn_stdin_reader() {
            tracing::warn!(error = %e, "Failed to start console reader");
        }
        ctx
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Level filter
    // ------------------------------------------------------------------

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    /// Whether a record at `level` would be written.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level()
    }

    // ------------------------------------------------------------------
    // Instance registry
    // ------------------------------------------------------------------

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Register a new instance of `type_name`. See [`InstanceRegistry::register`].
    pub fn register_instance(&self, type_name: &str) -> InstanceId {
        self.registry.register(type_name)
    }

    pub fn column_width(&self) -> usize {
        self.registry.column_width()
    }

    // ------------------------------------------------------------------
    // Command registry
    // ------------------------------------------------------------------

    /// Merge `batch` into the command table and return how many names were added.
    ///
    /// Names already registered keep their existing handler. The first batch
    /// that makes the table non-empty attaches the console (once per context).
    pub fn add_commands<I, N>(&self, batch: I) -> usize
    where
        I: IntoIterator<Item = (N, Command)>,
        N: Into<String>,
    {
        let outcome = self.commands.lock().merge(batch);
        if outcome.added > 0 {
            self.has_commands.store(true, Ordering::Release);
        }
        if outcome.first_commands {
            self.attach.call_once(|| self.attach_console());
        }
        outcome.added
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.lock().names()
    }

    pub fn has_commands(&self) -> bool {
        self.has_commands.load(Ordering::Acquire)
    }

    fn attach_console(&self) {
        if let Some(title) = &self.config.console_title {
            let _access = self.exclusive.access();
            self.write_bytes(format!("\x1b]0;{}\x07", title).as_bytes());
        }
        #[cfg(unix)]
        if self.config.close_on_signal {
            if let Err(e) = self.watch_signals(&CLOSE_SIGNALS, AfterClose::Terminate) {
                tracing::warn!(error = %e, "Failed to watch close signals");
            }
        }
        tracing::info!(title = ?self.config.console_title, "Console attached");
    }

    /// Start a watcher that closes this context when one of `signals` arrives.
    /// Replaces any watcher already running.
    #[cfg(unix)]
    pub(crate) fn watch_signals(&self, signals: &[i32], after: AfterClose) -> io::Result<()> {
        let watcher = SignalWatcher::spawn(self.this.clone(), signals, after)?;
        let previous = self.signals.lock().replace(watcher);
        drop(previous);
        Ok(())
    }

    /// Whether a close signal watcher is running.
    pub fn is_watching_signals(&self) -> bool {
        #[cfg(unix)]
        {
            self.signals.lock().is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    // ------------------------------------------------------------------
    // Command console
    // ------------------------------------------------------------------

    /// Tokenize one input line and queue it if its first token is a command.
    ///
    /// Returns whether a command was queued. Empty lines are ignored.
    pub fn submit_line(&self, line: &str) -> bool {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return false;
        }
        let queued = self.commands.lock().enqueue(tokens);
        if !queued {
            tracing::trace!(line = line.trim_end(), "No command matched");
        }
        queued
    }

    /// Snapshot of the queue as (name, tokens) pairs, oldest first.
    pub fn pending(&self) -> Vec<(String, Vec<String>)> {
        self.commands
            .lock()
            .queue()
            .iter()
            .map(|queued| (queued.name().to_string(), queued.tokens().to_vec()))
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.commands.lock().queue().len()
    }

    /// Run every command queued so far and return how many ran.
    ///
    /// The calling thread holds exclusive console access for the whole batch.
    /// Logging from a handler on this thread goes through without re-locking,
    /// while other threads wait for the batch to finish. Commands queued while
    /// the batch runs are left for the next call. Calling this from inside a
    /// handler does nothing and returns 0.
    ///
    /// A handler that panics is reported with a warning and counted as run;
    /// the rest of the batch still runs.
    ///
    /// A handler must not block on another thread that logs to this context:
    /// that thread is waiting for the drain to end.
    pub fn process_commands(&self) -> usize {
        let Some(_owner) = self.exclusive.own() else {
            tracing::debug!("Ignoring nested command drain");
            return 0;
        };

        let batch = self.commands.lock().take_queue();
        let count = batch.len();
        for queued in batch {
            tracing::trace!(command = queued.name(), "Running console command");
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| queued.run())) {
                tracing::warn!(
                    command = queued.name(),
                    panic = panic_message(payload.as_ref()),
                    "Console command panicked"
                );
            }
        }
        if count > 0 {
            tracing::debug!(count, "Drained console commands");
        }
        count
    }

    /// Whether a drain is running on any thread.
    pub fn is_draining(&self) -> bool {
        self.exclusive.is_owned()
    }

    /// Start a reader thread feeding `input` lines to
    /// [`submit_line`](Self::submit_line).
    ///
    /// The reader ends at end of input. Dropping the handle detaches it.
    pub fn spawn_reader<R>(self: &Arc<Self>, input: R) -> io::Result<JoinHandle<()>>
    where
        R: BufRead + Send + 'static,
    {
        reader::spawn(Arc::clone(self), input)
    }

    /// Start a reader on the process's stdin.
    pub fn spawn_stdin_reader(self: &Arc<Self>) -> io::Result<JoinHandle<()>> {
        self.spawn_reader(BufReader::new(io::stdin()))
    }

    // ------------------------------------------------------------------
    // Close hook
    // ------------------------------------------------------------------

    /// Set the callback run by [`close`](Self::close). Can only be set once.
    pub fn set_on_close<F>(&self, handler: F) -> ConsoleResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.close_handler_set.swap(true, Ordering::AcqRel) {
            return Err(ConsoleError::CloseHandlerAlreadySet);
        }
        *self.on_close.lock() = Some(Box::new(handler));
        Ok(())
    }

    /// Signal that the console is closing.
    ///
    /// Runs the close handler if one is set and this is the first call.
    /// Returns whether the handler ran.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let handler = self.on_close.lock().take();
        match handler {
            Some(handler) => {
                tracing::debug!("Running console close handler");
                handler();
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Write one complete record. The caller has already checked the level.
    pub(crate) fn write_record(
        &self,
        level: LogLevel,
        type_name: &str,
        instance_name: Option<&str>,
        id: InstanceId,
        payload: &str,
    ) {
        let _access = self.exclusive.access();

        let header = RecordHeader {
            level,
            timestamp: Local::now(),
            type_name,
            width: self.registry.column_width(),
            instance_name,
            id,
        };

        let mut out = String::with_capacity(64 + header.width + payload.len());
        if self.config.color {
            out.push_str(level.ansi_color());
        }
        out.push_str(&render_record(&header, payload));
        out.push('\n');
        if self.config.color {
            out.push_str(ANSI_RESET);
        }
        if self.has_commands() {
            out.push_str(&self.config.prompt);
        }
        self.write_bytes(out.as_bytes());
    }

    /// Print the prompt if any command is registered.
    pub fn write_prompt(&self) {
        if !self.has_commands() {
            return;
        }
        let _access = self.exclusive.access();
        self.write_bytes(self.config.prompt.as_bytes());
    }

    fn write_bytes(&self, bytes: &[u8]) {
        let mut sink = self.sink.lock();
        if let Err(e) = sink.write_all(bytes).and_then(|_| sink.flush()) {
            tracing::warn!(error = %e, "Console write failed");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("config", &self.config)
            .field("min_level", &self.min_level())
            .field("column_width", &self.column_width())
            .field("has_commands", &self.has_commands())
            .field("draining", &self.is_draining())
            .field("closed", &self.is_closed())
            .field("watching_signals", &self.is_watching_signals())
            .finish_non_exhaustive()
    }
}
