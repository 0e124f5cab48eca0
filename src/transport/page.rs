//! In-process page.
//!
//! Hosts without a JavaScript engine (tests, headless tools, native UIs
//! that embed the Rust shim directly) use [`ScriptEnvironment`] as the
//! page and [`PageView`] as the bridge's [`WebView`]. Script calls travel
//! over a channel and are applied to the page's [`Geolocation`] in order.
//!
//! ```text
//! Geolocation ──ShimMessage──▶ Bridge ──ScriptCall──▶ PageView
//!      ▲                                                 │
//!      └──────────── ScriptEnvironment ◀─────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::bridge::WebView;
use crate::error::{Error, Result};
use crate::protocol::ScriptCall;
use crate::shim::{Geolocation, UserScript};

use super::channel::{MessageSender, ScriptReceiver, ScriptSender, channel};

// ============================================================================
// PageView
// ============================================================================

/// [`WebView`] that forwards script calls to a [`ScriptEnvironment`].
#[derive(Debug, Clone)]
pub struct PageView {
    scripts: ScriptSender,
    installed: Arc<AtomicBool>,
}

impl PageView {
    /// Returns `true` once the shim script has been injected.
    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }
}

impl WebView for PageView {
    fn inject_user_script(&self, script: &UserScript) -> Result<()> {
        // The page already runs the Rust shim; only record the injection.
        trace!(bytes = script.source.len(), "Shim injected into in-process page");
        self.installed.store(true, Ordering::Release);
        Ok(())
    }

    fn evaluate(&self, call: &ScriptCall) -> Result<()> {
        if self.scripts.post(call.clone()) {
            Ok(())
        } else {
            Err(Error::ChannelClosed)
        }
    }
}

// ============================================================================
// ScriptEnvironment
// ============================================================================

/// The page side: a [`Geolocation`] plus the inbox of script calls.
pub struct ScriptEnvironment {
    geolocation: Geolocation,
    scripts: ScriptReceiver,
}

impl fmt::Debug for ScriptEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEnvironment")
            .field("geolocation", &self.geolocation)
            .finish_non_exhaustive()
    }
}

impl ScriptEnvironment {
    /// Creates a page whose shim posts to `messages`.
    ///
    /// Returns the page and the view to hand to the bridge.
    #[must_use]
    pub fn new(messages: MessageSender) -> (Self, PageView) {
        let (scripts_tx, scripts_rx) = channel();
        let environment = Self {
            geolocation: Geolocation::new(messages),
            scripts: scripts_rx,
        };
        let view = PageView {
            scripts: scripts_tx,
            installed: Arc::new(AtomicBool::new(false)),
        };
        (environment, view)
    }

    /// The page's `navigator.geolocation`.
    #[inline]
    #[must_use]
    pub fn geolocation(&self) -> Geolocation {
        self.geolocation.clone()
    }

    /// Applies every call already queued. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(call) = self.scripts.try_recv() {
            self.geolocation.dispatch(&call);
            applied += 1;
        }
        applied
    }

    /// Waits for the next call and applies it.
    ///
    /// Returns `false` once the view side is gone.
    pub async fn run_next(&mut self) -> bool {
        match self.scripts.recv().await {
            Some(call) => {
                self.geolocation.dispatch(&call);
                true
            }
            None => false,
        }
    }

    /// Applies calls on a background task until the view is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            while self.run_next().await {}
            debug!("Page script channel closed");
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
