//! Listener registry owned by a shim instance.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::task::AbortHandle;

use crate::identifiers::WatchId;
use crate::protocol::{Position, PositionError};

// ============================================================================
// Types
// ============================================================================

/// Callback invoked with a position.
pub type SuccessCallback = Arc<dyn Fn(&Position) + Send + Sync>;

/// Callback invoked with an error.
pub type ErrorCallback = Arc<dyn Fn(&PositionError) + Send + Sync>;

/// Returns a success callback that does nothing.
#[must_use]
pub fn noop_success() -> SuccessCallback {
    Arc::new(|_: &Position| {})
}

/// Returns an error callback that does nothing.
#[must_use]
pub fn noop_error() -> ErrorCallback {
    Arc::new(|_: &PositionError| {})
}

// ============================================================================
// Listener
// ============================================================================

/// A registered listener.
pub struct Listener {
    /// Registered through `getCurrentPosition`.
    pub onetime: bool,
    /// Success callback.
    pub success: SuccessCallback,
    /// Error callback.
    pub error: ErrorCallback,
    /// Pending timeout task, if a timeout was requested.
    timer: Option<AbortHandle>,
    /// A position was delivered; a late timer must not report `TIMEOUT`.
    settled: bool,
}

impl Listener {
    /// Creates a listener without a timer.
    #[must_use]
    pub fn new(onetime: bool, success: SuccessCallback, error: ErrorCallback) -> Self {
        Self {
            onetime,
            success,
            error,
            timer: None,
            settled: false,
        }
    }

    /// Returns `true` once a position was delivered to this listener.
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Cancels the pending timeout, if any.
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("onetime", &self.onetime)
            .field("timer", &self.timer.is_some())
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Mapping from [`WatchId`] to [`Listener`].
///
/// Ids come from a counter and are never handed out twice while the
/// previous holder is still registered.
pub struct ListenerRegistry {
    listeners: FxHashMap<WatchId, Listener>,
    next_id: WatchId,
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: FxHashMap::default(),
            next_id: WatchId::FIRST,
        }
    }

    /// Registers a listener and returns its id.
    pub fn insert(&mut self, listener: Listener) -> WatchId {
        let mut id = self.next_id;
        while self.listeners.contains_key(&id) {
            id = id.successor();
        }
        self.next_id = id.successor();
        self.listeners.insert(id, listener);
        id
    }

    /// Attaches a timeout task to a listener.
    ///
    /// Returns `false` (and aborts the task) if the listener is gone.
    pub fn set_timer(&mut self, id: WatchId, timer: AbortHandle) -> bool {
        match self.listeners.get_mut(&id) {
            Some(listener) => {
                listener.cancel_timer();
                listener.timer = Some(timer);
                true
            }
            None => {
                timer.abort();
                false
            }
        }
    }

    /// Removes a listener. Its timer, if any, is cancelled.
    pub fn remove(&mut self, id: WatchId) -> Option<Listener> {
        self.listeners.remove(&id)
    }

    /// Returns `true` if `id` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: WatchId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Returns the listener registered under `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: WatchId) -> Option<&Listener> {
        self.listeners.get(&id)
    }

    /// Number of registered listeners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Snapshot of every listener for a success broadcast.
    ///
    /// A delivery satisfies any pending timeout, so timers are cancelled and
    /// every listener is marked settled.
    pub fn success_targets(&mut self) -> Vec<(WatchId, SuccessCallback)> {
        self.listeners
            .iter_mut()
            .map(|(id, listener)| {
                listener.cancel_timer();
                listener.settled = true;
                (*id, Arc::clone(&listener.success))
            })
            .collect()
    }

    /// Removes the one-shot listeners among `ids` and returns how many were
    /// removed.
    pub fn prune_onetime(&mut self, ids: &[WatchId]) -> usize {
        let mut pruned = 0;
        for id in ids {
            if self.listeners.get(id).is_some_and(|listener| listener.onetime) {
                self.listeners.remove(id);
                pruned += 1;
            }
        }
        pruned
    }

    /// Removes every listener and returns their error callbacks.
    pub fn drain(&mut self) -> Vec<ErrorCallback> {
        self.listeners
            .drain()
            .map(|(_, listener)| Arc::clone(&listener.error))
            .collect()
    }

    /// Claims a listener whose timeout elapsed.
    ///
    /// Returns its error callback and whether it was a one-shot, which is
    /// removed. Returns `None` if the listener is gone or already settled,
    /// since an abort can lose the race with a timer that finished sleeping.
    /// Called from inside the timer task itself.
    pub(crate) fn expire(&mut self, id: WatchId) -> Option<(ErrorCallback, bool)> {
        let listener = self.listeners.get_mut(&id)?;
        // Detach first so removing the listener does not abort this task.
        let _ = listener.timer.take();
        if listener.settled {
            return None;
        }

        let error = Arc::clone(&listener.error);
        let onetime = listener.onetime;
        if onetime {
            self.listeners.remove(&id);
        }
        Some((error, onetime))
    }
}

// ============================================================================
// Tests
// ============================================================================
