//! Command table and FIFO queue.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// A console command handler.
///
/// Receives the whole tokenized line, command name included.
pub type Command = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Build a [`Command`] from a closure.
pub fn command<F>(handler: F) -> Command
where
    F: Fn(&[String]) + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// A resolved command waiting for the next drain.
pub struct QueuedCommand {
    name: String,
    tokens: Vec<String>,
    handler: Command,
}

impl QueuedCommand {
    /// The command name (first token).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every token on the line, command name first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub(crate) fn run(&self) {
        (self.handler)(&self.tokens);
    }
}

impl fmt::Debug for QueuedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedCommand")
            .field("name", &self.name)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Registered commands plus the queue filled by the reader.
#[derive(Default)]
pub(crate) struct CommandState {
    table: BTreeMap<String, Command>,
    queue: VecDeque<QueuedCommand>,
}

/// Outcome of merging a batch into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MergeOutcome {
    pub added: usize,
    pub first_commands: bool,
}

impl CommandState {
    /// Add every name not already present. Existing handlers are kept.
    pub(crate) fn merge<I, N>(&mut self, batch: I) -> MergeOutcome
    where
        I: IntoIterator<Item = (N, Command)>,
        N: Into<String>,
    {
        let was_empty = self.is_empty();
        let mut added = 0;
        for (name, handler) in batch {
            let name = name.into();
            if self.table.contains_key(&name) {
                tracing::debug!(command = %name, "Command already registered, keeping existing handler");
                continue;
            }
            self.table.insert(name, handler);
            added += 1;
        }
        MergeOutcome {
            added,
            first_commands: was_empty && !self.is_empty(),
        }
    }

    /// Queue `tokens` if the first one names a command. Returns whether it matched.
    pub(crate) fn enqueue(&mut self, tokens: Vec<String>) -> bool {
        let Some(first) = tokens.first() else {
            return false;
        };
        let Some(handler) = self.table.get(first) else {
            return false;
        };
        let queued = QueuedCommand {
            name: first.clone(),
            handler: Arc::clone(handler),
            tokens,
        };
        self.queue.push_back(queued);
        true
    }

    /// Take everything queued so far, oldest first.
    pub(crate) fn take_queue(&mut self) -> VecDeque<QueuedCommand> {
        std::mem::take(&mut self.queue)
    }

    pub(crate) fn queue(&self) -> &VecDeque<QueuedCommand> {
        &self.queue
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.table.keys().cloned().collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
