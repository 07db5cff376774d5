//! Named OS threads that log under their own instance.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::context::LogContext;
use crate::logger::{Loggable, Logger};

/// A thread that is itself a loggable instance.
///
/// The body receives the thread's logger, so its records carry the
/// `LoggableThread` label, the thread name and the thread's own id.
pub struct LoggableThread {
    logger: Arc<Logger>,
    handle: JoinHandle<()>,
}

impl Loggable for LoggableThread {
    const TYPE_NAME: &'static str = "LoggableThread";

    fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl LoggableThread {
    /// Spawn `body` on a new OS thread named `name`.
    pub fn spawn<F>(ctx: &Arc<LogContext>, name: impl Into<String>, body: F) -> io::Result<Self>
    where
        F: FnOnce(&Logger) + Send + 'static,
    {
        let name = name.into();
        let logger = Arc::new(Logger::named::<Self>(ctx, name.clone()));
        let handle = {
            let logger = Arc::clone(&logger);
            thread::Builder::new().name(name).spawn(move || body(&logger))?
        };
        Ok(Self { logger, handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the body to return. `Err` carries the panic payload.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::format::parse_record;
    use crate::level::LogLevel;
    use crate::sink::MemorySink;

    #[test]
    fn test_thread_logs_under_its_own_name() {
        let sink = MemorySink::new();
        let ctx = LogContext::with_sink(
            ConsoleConfig::default().with_console_title(None),
            sink.clone(),
        );

        let worker = LoggableThread::spawn(&ctx, "loader", |logger| {
            assert_eq!(std::thread::current().name(), Some("loader"));
            logger.warning(&[&"working"]);
        })
        .unwrap();
        let id = worker.instance_id();
        worker.join().unwrap();

        let record = parse_record(sink.contents().trim_end()).unwrap();
        assert_eq!(record.level, LogLevel::Warning);
        assert_eq!(record.type_name, "LoggableThread");
        assert_eq!(record.instance_name.as_deref(), Some("loader"));
        assert_eq!(record.id, id.get());
    }
}
