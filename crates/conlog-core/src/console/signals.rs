//! Close the console when the host asks the process to stop.
//!
//! On unix a watcher thread waits for SIGINT or SIGTERM, runs
//! [`LogContext::close`] and then lets the signal's default action end the
//! process. The watcher only holds a weak reference, so it never keeps a
//! context alive.

use std::io;
use std::sync::Weak;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

use crate::context::LogContext;

/// Name given to the signal watcher thread.
pub const SIGNAL_THREAD_NAME: &str = "conlog-signals";

/// Signals that close the console.
pub const CLOSE_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// What the watcher does once the console is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AfterClose {
    /// Re-deliver the signal's default action
    Terminate,
    /// Keep running and ignore further signals
    Continue,
}

#[derive(Debug)]
pub(crate) struct SignalWatcher {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatcher {
    pub(crate) fn spawn(
        ctx: Weak<LogContext>,
        signals: &[i32],
        after: AfterClose,
    ) -> io::Result<Self> {
        let mut signals = Signals::new(signals)?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name(SIGNAL_THREAD_NAME.to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    tracing::warn!(signal, "Close signal received");
                    if let Some(ctx) = ctx.upgrade() {
                        ctx.close();
                    }
                    if after == AfterClose::Terminate {
                        if let Err(e) = signal_hook::low_level::emulate_default_handler(signal) {
                            tracing::warn!(error = %e, "Failed to re-raise close signal");
                        }
                    }
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalWatcher {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            // The last context reference can be released on the watcher itself
            if thread.thread().id() != thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}
