//! Cancellation registry for cooperative, pre-start cancellation.
//!
//! Each cancellable submission registers an entry holding a shared
//! [`CancellationFlag`]. The flag travels with the queued task and is checked
//! exactly once, when a worker dequeues it.
//!
//! Entries are kept for the lifetime of the scheduler and only released by
//! [`CancellationRegistry::clear`] at teardown, or by
//! [`CancellationRegistry::remove`] when a submission is rejected. Long-lived schedulers with many
//! cancellable submissions therefore grow this map without bound.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::TaskId;

/// Shared write-once-to-true flag linking a registry entry to its queued task.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Setting it again has no further effect.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been observed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct RegistryState {
    next_id: TaskId,
    entries: HashMap<TaskId, CancellationFlag>,
}

/// Append-only map from task identifier to cancellation flag.
pub struct CancellationRegistry {
    state: Mutex<RegistryState>,
}

impl CancellationRegistry {
    /// Create an empty registry whose first identifier is 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_id: 0,
                entries: HashMap::new(),
            }),
        }
    }

    /// Allocate the next identifier and register an unset flag for it.
    pub fn register(&self) -> (TaskId, CancellationFlag) {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let flag = CancellationFlag::new();
        state.entries.insert(id, flag.clone());
        (id, flag)
    }

    /// Set the flag for `id`.
    ///
    /// Returns `false` if `id` was never registered. Returns `true` for any known
    /// id, even if its task is already running or finished; in that case the
    /// flag no longer has any effect.
    pub fn cancel(&self, id: TaskId) -> bool {
        let state = self.state.lock();
        state.entries.get(&id).is_some_and(|flag| {
            flag.cancel();
            true
        })
    }

    /// Current flag state for `id`, or `None` if unknown.
    pub fn is_cancelled(&self, id: TaskId) -> Option<bool> {
        self.state.lock().entries.get(&id).map(CancellationFlag::is_cancelled)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Release the entry for `id`. Returns `false` if it was not retained.
    pub fn remove(&self, id: TaskId) -> bool {
        self.state.lock().entries.remove(&id).is_some()
    }

    /// Release every entry. Identifiers keep increasing afterwards.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}

impl Default for CancellationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
