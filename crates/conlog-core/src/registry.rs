//! Instance registry: identity allocation and type-name column width.
//!
//! The registry keeps no per-instance state. Names and ids are read from
//! each instance's [`Logger`](crate::Logger) when a record is written, so
//! dropping an instance needs no cleanup here. The only shared values are
//! the column width and the id counter, both plain atomics.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Stable identity of a loggable instance, rendered as `0x<hex>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Wrap a raw id.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Column width and id allocation shared by every instance of a context.
#[derive(Debug)]
pub struct InstanceRegistry {
    column_width: AtomicUsize,
    next_id: AtomicU64,
    registered: AtomicUsize,
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            column_width: AtomicUsize::new(0),
            // Ids start at 1 so the rendered hex is never empty
            next_id: AtomicU64::new(1),
            registered: AtomicUsize::new(0),
        }
    }

    /// Record a new instance of `type_name` and hand out its id.
    ///
    /// Widens the column to the type name's char count if it is the longest
    /// seen so far. The width never shrinks.
    pub fn register(&self, type_name: &str) -> InstanceId {
        let width = type_name.chars().count();
        let previous = self.column_width.fetch_max(width, Ordering::AcqRel);
        if width > previous {
            tracing::trace!(type_name, width, "Column width grew");
        }
        self.registered.fetch_add(1, Ordering::Relaxed);
        InstanceId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Current padding width for the type-name field.
    pub fn column_width(&self) -> usize {
        self.column_width.load(Ordering::Acquire)
    }

    /// Total number of registrations so far.
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }
}
