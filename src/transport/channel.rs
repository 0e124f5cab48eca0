//! One-way, fire-and-forget channels.
//!
//! Every boundary crossing in the bridge goes through an [`Outbox`]: the
//! sender never waits and never learns whether the message was handled.
//! Delivery order is the order of `post` calls from one side.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

use crate::bridge::ProviderEvent;
use crate::protocol::{ScriptCall, ShimMessage};

// ============================================================================
// Types
// ============================================================================

/// Shim → bridge sender.
pub type MessageSender = Outbox<ShimMessage>;
/// Shim → bridge receiver.
pub type MessageReceiver = mpsc::UnboundedReceiver<ShimMessage>;

/// Provider → bridge sender.
pub type ProviderSender = Outbox<ProviderEvent>;
/// Provider → bridge receiver.
pub type ProviderReceiver = mpsc::UnboundedReceiver<ProviderEvent>;

/// Bridge → page sender.
pub type ScriptSender = Outbox<ScriptCall>;
/// Bridge → page receiver.
pub type ScriptReceiver = mpsc::UnboundedReceiver<ScriptCall>;

// ============================================================================
// Outbox
// ============================================================================

/// Sending half of a fire-and-forget channel.
pub struct Outbox<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for Outbox<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for Outbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbox")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<T: fmt::Debug> Outbox<T> {
    /// Posts a message.
    ///
    /// Returns `false` if the receiver is gone; the message is dropped.
    pub fn post(&self, message: T) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(mpsc::error::SendError(message)) => {
                trace!(?message, "Receiver gone, message dropped");
                false
            }
        }
    }

    /// Returns `true` if the receiver has been dropped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Creates a fire-and-forget channel.
#[must_use]
pub fn channel<T>() -> (Outbox<T>, mpsc::UnboundedReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Outbox { tx }, rx)
}

// ============================================================================
// Tests
// ============================================================================
