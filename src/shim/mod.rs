//! Page-side geolocation shim.
//!
//! [`Geolocation`] stands in for `navigator.geolocation` inside the page.
//! Page code registers listeners through the three standard entry points;
//! the host pushes results through [`Geolocation::success`] and
//! [`Geolocation::error`], which fan out to every registered listener.
//!
//! The same behavior ships as JavaScript in [`assets`] for real web views.
//!
//! # Delivery Rules
//!
//! | Event | Callbacks | Registry afterwards | Posted |
//! |-------|-----------|---------------------|--------|
//! | `success` | every listener | one-shot listeners pruned | `listenerRemoved` per pruned |
//! | `error` | every listener | empty | `listenersReset` |
//! | timeout | that listener | one-shot removed | `listenerRemoved` |
//! | `clearWatch` | none | id removed | `listenerRemoved` |
//!
//! # Example
//!
//! ```ignore
//! use webview_geolocation::{Geolocation, PositionOptions, transport::channel};
//!
//! let (outbox, inbox) = channel();
//! let geolocation = Geolocation::new(outbox);
//! let id = geolocation.watch_position(
//!     |position| println!("at {:?}", position.coords),
//!     |error| eprintln!("{error}"),
//!     PositionOptions::default(),
//! );
//! geolocation.clear_watch(id);
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// JavaScript polyfill and its injection settings.
pub mod assets;

/// Options accepted by the entry points.
pub mod options;

/// Listener registry.
pub mod registry;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::identifiers::WatchId;
use crate::protocol::{
    ErrorCode, Position, PositionError, PositionSample, ScriptCall, ShimMessage, now_millis,
};
use crate::transport::MessageSender;

pub use assets::{InjectionTime, UserScript};
pub use options::PositionOptions;
pub use registry::{ErrorCallback, Listener, ListenerRegistry, SuccessCallback};

// ============================================================================
// Constants
// ============================================================================

/// Message delivered with `TIMEOUT` errors.
const TIMEOUT_MESSAGE: &str = "Timeout expired";

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a shim.
struct ShimInner {
    /// Registered listeners.
    registry: Mutex<ListenerRegistry>,
    /// Messaging channel to the bridge.
    outbox: MessageSender,
}

// ============================================================================
// Geolocation
// ============================================================================

/// The page's geolocation object.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct Geolocation {
    inner: Arc<ShimInner>,
}

impl fmt::Debug for Geolocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geolocation")
            .field("listeners", &self.len())
            .finish_non_exhaustive()
    }
}

impl Geolocation {
    /// Creates a shim posting to `outbox`.
    #[must_use]
    pub fn new(outbox: MessageSender) -> Self {
        Self {
            inner: Arc::new(ShimInner {
                registry: Mutex::new(ListenerRegistry::new()),
                outbox,
            }),
        }
    }
}

// ============================================================================
// Geolocation - Page API
// ============================================================================

impl Geolocation {
    /// Requests a single position.
    ///
    /// Posts `listenerAdded` followed by the `locationHandler` fast-path
    /// request. The returned id may be ignored.
    pub fn get_current_position<S, E>(
        &self,
        success: S,
        error: E,
        options: PositionOptions,
    ) -> WatchId
    where
        S: Fn(&Position) + Send + Sync + 'static,
        E: Fn(&PositionError) + Send + Sync + 'static,
    {
        let success: SuccessCallback = Arc::new(success);
        let error: ErrorCallback = Arc::new(error);
        let id = self.register(true, Some(success), Some(error), options);
        self.post(ShimMessage::get_current_position());
        id
    }

    /// Watches the position until [`Geolocation::clear_watch`] or an error.
    pub fn watch_position<S, E>(&self, success: S, error: E, options: PositionOptions) -> WatchId
    where
        S: Fn(&Position) + Send + Sync + 'static,
        E: Fn(&PositionError) + Send + Sync + 'static,
    {
        let success: SuccessCallback = Arc::new(success);
        let error: ErrorCallback = Arc::new(error);
        self.register(false, Some(success), Some(error), options)
    }

    /// Registers a listener from optional callbacks.
    ///
    /// Missing callbacks become no-ops, as the web API allows.
    pub fn register(
        &self,
        onetime: bool,
        success: Option<SuccessCallback>,
        error: Option<ErrorCallback>,
        options: PositionOptions,
    ) -> WatchId {
        let success = success.unwrap_or_else(registry::noop_success);
        let error = error.unwrap_or_else(registry::noop_error);

        let id = self
            .inner
            .registry
            .lock()
            .insert(Listener::new(onetime, success, error));

        debug!(%id, onetime, "Listener registered");
        self.post(ShimMessage::ListenerAdded);

        if let Some(timeout) = options.timeout {
            self.schedule_timeout(id, timeout);
        }

        id
    }

    /// Cancels a listener.
    ///
    /// Unknown or already removed ids are ignored.
    pub fn clear_watch(&self, id: WatchId) {
        let removed = self.inner.registry.lock().remove(id);

        if removed.is_some() {
            debug!(%id, "Watch cleared");
            self.post(ShimMessage::ListenerRemoved);
        } else {
            trace!(%id, "clearWatch for unknown id");
        }
    }

    /// Number of registered listeners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Returns `true` if no listener is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.registry.lock().is_empty()
    }

    /// Returns `true` if `id` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: WatchId) -> bool {
        self.inner.registry.lock().contains(id)
    }
}

// ============================================================================
// Geolocation - Host Entry Points
// ============================================================================

impl Geolocation {
    /// Delivers a position to every listener, then prunes one-shot ones.
    ///
    /// Listeners registered by a callback during the broadcast neither
    /// receive this position nor get pruned by it.
    pub fn success(&self, sample: &PositionSample) {
        let position = sample.to_position(now_millis());
        let targets = self.inner.registry.lock().success_targets();

        trace!(listeners = targets.len(), "Broadcasting position");
        for (_, callback) in &targets {
            callback(&position);
        }

        let ids: Vec<WatchId> = targets.into_iter().map(|(id, _)| id).collect();
        let pruned = self.inner.registry.lock().prune_onetime(&ids);

        for _ in 0..pruned {
            self.post(ShimMessage::ListenerRemoved);
        }
        if pruned > 0 {
            debug!(pruned, "One-shot listeners resolved");
        }
    }

    /// Delivers an error to every listener and clears the registry.
    ///
    /// `listenersReset` is posted before callbacks run, so listeners they
    /// register are counted after the reset.
    pub fn error(&self, code: u16, message: &str) {
        let error = PositionError::new(ErrorCode::from_code(code), message);
        let targets = self.inner.registry.lock().drain();

        if !targets.is_empty() {
            self.post(ShimMessage::ListenersReset);
        }

        debug!(code = error.code.as_u16(), listeners = targets.len(), "Broadcasting error");
        for callback in &targets {
            callback(&error);
        }
    }

    /// Applies a script call pushed by the bridge.
    pub fn dispatch(&self, call: &ScriptCall) {
        match call {
            ScriptCall::Success(sample) => self.success(sample),
            ScriptCall::Error { code, message } => self.error(*code, message),
        }
    }
}

// ============================================================================
// Geolocation - Internals
// ============================================================================

impl Geolocation {
    fn post(&self, message: ShimMessage) {
        if !self.inner.outbox.post(message) {
            debug!("Bridge gone, notification dropped");
        }
    }

    /// Arms a `TIMEOUT` for `id`. Needs a tokio runtime.
    fn schedule_timeout(&self, id: WatchId, timeout: std::time::Duration) {
        let Ok(handle) = Handle::try_current() else {
            warn!(%id, "No async runtime, timeout ignored");
            return;
        };

        let shim = Arc::downgrade(&self.inner);
        let task = handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            Self::expire(&shim, id);
        });

        self.inner
            .registry
            .lock()
            .set_timer(id, task.abort_handle());
    }

    /// Timer body: reports `TIMEOUT` to a listener that got nothing in time.
    fn expire(shim: &Weak<ShimInner>, id: WatchId) {
        let Some(inner) = shim.upgrade() else {
            return;
        };

        let Some((error, onetime)) = inner.registry.lock().expire(id) else {
            return;
        };

        debug!(%id, onetime, "Listener timed out");
        error(&PositionError::timeout(TIMEOUT_MESSAGE));

        if onetime && !inner.outbox.post(ShimMessage::ListenerRemoved) {
            debug!("Bridge gone, notification dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
