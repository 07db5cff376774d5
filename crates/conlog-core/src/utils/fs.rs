//! File helpers that report failures on the console instead of returning errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::context::LogContext;
use crate::logger::{Loggable, Logger};
use crate::utils::encoding::decode_text;

/// Access to files under a resource folder.
///
/// Missing files are logged at Error and read back as an empty string, so an
/// empty file and a missing one look the same to the caller.
pub struct Resources {
    logger: Logger,
    root: RwLock<PathBuf>,
}

impl Loggable for Resources {
    const TYPE_NAME: &'static str = "Resources";

    fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Resources {
    /// Resources rooted at the context's configured `resource_dir`.
    pub fn new(ctx: &Arc<LogContext>) -> Self {
        let root = ctx.config().resource_dir.clone();
        Self::with_root(ctx, root)
    }

    pub fn with_root(ctx: &Arc<LogContext>, root: impl Into<PathBuf>) -> Self {
        Self {
            logger: Logger::new::<Self>(ctx),
            root: RwLock::new(root.into()),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.root.read().clone()
    }

    pub fn set_root(&self, root: impl Into<PathBuf>) {
        *self.root.write() = root.into();
    }

    /// `path` resolved against the resource folder. Absolute paths are returned as-is.
    pub fn resource(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.read().join(path)
    }

    /// Read a file as UTF-8, replacing invalid sequences.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> String {
        self.read_bytes(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    /// Read a file through [`decode_text`], honoring BOMs and legacy encodings.
    pub fn read_text(&self, path: impl AsRef<Path>) -> String {
        self.read_bytes(path.as_ref())
            .map(|bytes| decode_text(&bytes))
            .unwrap_or_default()
    }

    /// Entries of `dir`, sorted by path. Empty if the directory cannot be read.
    pub fn list_files(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.log_error(&[&"Cannot list ", &dir.display(), &": ", &e]);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .collect();
        files.sort();
        files
    }

    fn read_bytes(&self, path: &Path) -> Option<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Resource read failed");
                self.log_error(&[&"File ", &path.display(), &" not found"]);
                None
            }
        }
    }
}
