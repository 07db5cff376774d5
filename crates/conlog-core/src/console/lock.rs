//! Exclusive console access with an explicit owner token.
//!
//! A record write takes the lock for the length of one write. A drain
//! takes it as the *owner* for the whole batch, and the owner's thread
//! token is published so that logging from inside a command handler on
//! that same thread passes straight through instead of deadlocking.
//! Every other thread still blocks until the drain finishes.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

const NO_OWNER: usize = 0;

static NEXT_THREAD_TOKEN: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static THREAD_TOKEN: usize = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
}

fn current_token() -> usize {
    THREAD_TOKEN.with(|token| *token)
}

pub(crate) struct ExclusiveLock {
    mutex: Mutex<()>,
    owner: AtomicUsize,
}

/// Access obtained for a single write.
pub(crate) enum Access<'a> {
    /// Lock taken by this call, released on drop
    Acquired(#[allow(dead_code)] MutexGuard<'a, ()>),
    /// The current thread already owns the lock through a drain
    Nested,
}

/// Ownership held for the span of a drain.
pub(crate) struct OwnerGuard<'a> {
    lock: &'a ExclusiveLock,
    _guard: MutexGuard<'a, ()>,
}

impl ExclusiveLock {
    pub(crate) fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            owner: AtomicUsize::new(NO_OWNER),
        }
    }

    fn owned_by_current(&self) -> bool {
        self.owner.load(Ordering::Acquire) == current_token()
    }

    /// Take the lock for one write, or pass through if this thread owns it.
    pub(crate) fn access(&self) -> Access<'_> {
        if self.owned_by_current() {
            Access::Nested
        } else {
            Access::Acquired(self.mutex.lock())
        }
    }

    /// Take ownership for a drain. `None` if this thread already owns it.
    pub(crate) fn own(&self) -> Option<OwnerGuard<'_>> {
        if self.owned_by_current() {
            return None;
        }
        let guard = self.mutex.lock();
        self.owner.store(current_token(), Ordering::Release);
        Some(OwnerGuard {
            lock: self,
            _guard: guard,
        })
    }

    /// Whether any thread currently owns the lock through a drain.
    pub(crate) fn is_owned(&self) -> bool {
        self.owner.load(Ordering::Acquire) != NO_OWNER
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        // Cleared before the mutex guard field drops
        self.lock.owner.store(NO_OWNER, Ordering::Release);
    }
}
