//! Bridge runner.
//!
//! [`Bridge`] owns a [`BridgeController`] and drives it from two inboxes:
//! shim messages from the page and events from the location provider.
//!
//! # Lifecycle
//!
//! 1. [`Bridge::builder`] validates options and injects the shim
//! 2. [`Bridge::spawn`] moves the controller into a tokio task
//! 3. The task runs until [`BridgeHandle::shutdown`], the handle is
//!    dropped, or the page's message channel closes
//! 4. On exit, sensing is stopped

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::transport::{MessageReceiver, ProviderReceiver};

use super::builder::BridgeBuilder;
use super::controller::{BridgeController, BridgeStatus, SensingState};
use super::provider::LocationProvider;
use super::view::WebView;

// ============================================================================
// Bridge
// ============================================================================

/// A configured bridge, not yet running.
pub struct Bridge<P, V> {
    controller: BridgeController<P, V>,
}

impl<P, V> fmt::Debug for Bridge<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("controller", &self.controller)
            .finish()
    }
}

impl Bridge<(), ()> {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }
}

impl<P, V> Bridge<P, V>
where
    P: LocationProvider,
    V: WebView,
{
    pub(crate) fn new(controller: BridgeController<P, V>) -> Self {
        Self { controller }
    }

    /// Bridge identifier used in logs.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.controller.id()
    }

    /// The controller, for hosts that drive it synchronously.
    #[inline]
    #[must_use]
    pub fn into_controller(self) -> BridgeController<P, V> {
        self.controller
    }

    /// Starts the bridge on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(self, messages: MessageReceiver, events: ProviderReceiver) -> BridgeHandle {
        let id = self.controller.id();
        let status = self.controller.status();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(Self::run_event_loop(
            self.controller,
            messages,
            events,
            shutdown_rx,
        ));

        BridgeHandle {
            id,
            status,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Event loop feeding the controller.
    async fn run_event_loop(
        mut controller: BridgeController<P, V>,
        mut messages: MessageReceiver,
        mut events: ProviderReceiver,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let id = controller.id();
        let mut events_open = true;

        loop {
            tokio::select! {
                // Shutdown requested or handle dropped
                _ = &mut shutdown_rx => {
                    debug!(bridge_id = %id, "Shutdown requested");
                    break;
                }

                // Notifications from the page shim
                message = messages.recv() => {
                    match message {
                        Some(message) => controller.handle_message(message),
                        None => {
                            debug!(bridge_id = %id, "Page message channel closed");
                            controller.reset();
                            break;
                        }
                    }
                }

                // Callbacks from the location provider
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => controller.handle_provider_event(event),
                        None => {
                            warn!(bridge_id = %id, "Provider event channel closed");
                            events_open = false;
                        }
                    }
                }
            }
        }

        controller.shutdown();
    }
}

// ============================================================================
// BridgeHandle
// ============================================================================

/// Handle to a running bridge.
///
/// Dropping the handle shuts the bridge down.
pub struct BridgeHandle {
    id: Uuid,
    status: Arc<BridgeStatus>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("id", &self.id)
            .field("listener_count", &self.listener_count())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl BridgeHandle {
    /// Bridge identifier used in logs.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Listeners the bridge believes the page has.
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.status.listener_count()
    }

    /// Current sensing state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SensingState {
        self.status.state()
    }

    /// Returns `true` once the runner task has exited.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Asks the runner to stop. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Waits for the runner to exit.
    ///
    /// Does not request shutdown; the runner also exits when the page's
    /// message channel closes.
    pub async fn join(self) {
        let Self {
            id,
            shutdown_tx,
            task,
            ..
        } = self;

        // Dropping the sender would stop the runner
        let result = task.await;
        drop(shutdown_tx);

        if let Err(e) = result {
            warn!(bridge_id = %id, error = %e, "Bridge task failed");
        }
    }

    /// Requests shutdown and waits for the runner to exit.
    pub async fn stop(mut self) {
        self.shutdown();
        self.join().await;
    }
}
