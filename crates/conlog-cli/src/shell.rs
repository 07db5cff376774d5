//! Built-in console commands.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use conlog_core::utils::encoding::{base64_decode, decode_text};
use conlog_core::utils::friendly_bytes;
use conlog_core::{
    command, log_debug, log_info, log_warning, Command, LogContext, LogLevel, Loggable, Logger,
    Resources,
};
use parking_lot::Mutex;

/// State shared by the built-in commands.
pub struct Shell {
    logger: Logger,
    resources: Resources,
    /// Loggers created through `spawn`, kept alive for the session
    workers: Mutex<Vec<Logger>>,
    /// Type labels handed out so far, one allocation per distinct label
    labels: Mutex<HashMap<String, &'static str>>,
}

impl Loggable for Shell {
    const TYPE_NAME: &'static str = "Shell";

    fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Shell {
    pub fn new(ctx: &Arc<LogContext>) -> Arc<Self> {
        Arc::new(Self {
            logger: Logger::named::<Self>(ctx, "conlog"),
            resources: Resources::new(ctx),
            workers: Mutex::new(Vec::new()),
            labels: Mutex::new(HashMap::new()),
        })
    }

    fn ctx(&self) -> &Arc<LogContext> {
        self.logger.context()
    }

    /// Register every built-in command on the shell's context.
    pub fn install(self: &Arc<Self>) -> usize {
        let entries: [(&str, fn(&Shell, &[String])); 9] = [
            ("help", Shell::help),
            ("echo", Shell::echo),
            ("level", Shell::level),
            ("spawn", Shell::spawn),
            ("cat", Shell::cat),
            ("ls", Shell::ls),
            ("b64", Shell::b64),
            ("bytes", Shell::bytes),
            ("quit", Shell::quit),
        ];

        let batch: Vec<(&str, Command)> = entries
            .into_iter()
            .map(|(name, run)| {
                let shell = Arc::clone(self);
                (name, command(move |args| run(&shell, args)))
            })
            .collect();
        self.ctx().add_commands(batch)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn help(&self, _args: &[String]) {
        let names = self.ctx().command_names().join(", ");
        log_info!(self, "Commands: ", names);
    }

    fn echo(&self, args: &[String]) {
        log_debug!(self, args[1..].join(" "));
    }

    fn level(&self, args: &[String]) {
        let Some(name) = args.get(1) else {
            log_info!(self, "Minimum level is ", self.ctx().min_level());
            return;
        };
        match name.parse::<LogLevel>() {
            Ok(level) => {
                self.ctx().set_min_level(level);
                // Logged at the new level so the confirmation is never filtered
                self.log(level, &[&"Minimum level set to ", &level]);
            }
            Err(e) => log_warning!(self, e),
        }
    }

    fn spawn(&self, args: &[String]) {
        let Some(type_name) = args.get(1) else {
            log_warning!(self, "Usage: spawn <TypeName> [name]");
            return;
        };
        let label = self.intern(type_name);
        let worker = Logger::with_type_name(self.ctx(), label, args.get(2).cloned());
        log_info!(worker, "Spawned, column width is now ", self.ctx().column_width());
        self.workers.lock().push(worker);
    }

    fn cat(&self, args: &[String]) {
        let Some(path) = args.get(1) else {
            log_warning!(self, "Usage: cat <path>");
            return;
        };
        let text = self.resources.read_text(self.resources.resource(path));
        for line in text.lines() {
            log_info!(self.resources, line);
        }
    }

    fn ls(&self, args: &[String]) {
        let dir = args
            .get(1)
            .map(|dir| self.resources.resource(dir))
            .unwrap_or_else(|| self.resources.root());
        let files = self.resources.list_files(&dir);
        if files.is_empty() {
            log_info!(self.resources, "No files in ", dir.display());
        }
        for file in files {
            log_info!(self.resources, file_label(file));
        }
    }

    fn b64(&self, args: &[String]) {
        match base64_decode(&args[1..].concat()) {
            Ok(bytes) => log_info!(self, decode_text(&bytes)),
            Err(e) => log_warning!(self, e),
        }
    }

    fn bytes(&self, args: &[String]) {
        match args.get(1).map(|n| n.parse::<u64>()) {
            Some(Ok(n)) => log_info!(self, n, " bytes is ", friendly_bytes(n)),
            _ => log_warning!(self, "Usage: bytes <count>"),
        }
    }

    fn quit(&self, _args: &[String]) {
        log_info!(self, "Closing console");
        self.ctx().close();
    }

    fn intern(&self, type_name: &str) -> &'static str {
        let mut labels = self.labels.lock();
        if let Some(&label) = labels.get(type_name) {
            return label;
        }
        let label: &'static str = Box::leak(type_name.to_owned().into_boxed_str());
        labels.insert(type_name.to_owned(), label);
        label
    }
}

fn file_label(path: PathBuf) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
