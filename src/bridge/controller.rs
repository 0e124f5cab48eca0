//! Native side of the geolocation bridge.
//!
//! [`BridgeController`] counts the page's listeners, decides when to ask
//! for permission, and starts or stops sensing. It is synchronous: the
//! [`Bridge`](super::Bridge) runner feeds it one message or event at a
//! time.
//!
//! # Permission Decision
//!
//! Runs on every `listenerAdded` and on authorization changes while
//! listeners exist. Status is re-queried from the provider each time.
//!
//! | Condition | Action |
//! |-----------|--------|
//! | services disabled | `error(2, "Location service disabled")` |
//! | denied or restricted | `error(1, "App does not have location permission")` |
//! | not determined | request authorization (on `listenerAdded` only) |
//! | authorized | start sensing if idle |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::protocol::message::GET_CURRENT_POSITION;
use crate::protocol::{ErrorCode, ScriptCall, ShimMessage};

use super::builder::BridgeOptions;
use super::provider::{AuthorizationStatus, LocationProvider, ProviderEvent};
use super::view::WebView;

// ============================================================================
// Constants
// ============================================================================

/// Message pushed when location services are off.
pub const SERVICES_DISABLED_MESSAGE: &str = "Location service disabled";

/// Message pushed when the app lacks permission.
pub const PERMISSION_DENIED_MESSAGE: &str = "App does not have location permission";

// ============================================================================
// SensingState
// ============================================================================

/// Whether the provider is delivering updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensingState {
    /// Not sensing.
    #[default]
    Idle,
    /// Updates requested from the provider.
    Sensing,
}

impl SensingState {
    /// Returns `true` while sensing.
    #[inline]
    #[must_use]
    pub const fn is_sensing(self) -> bool {
        matches!(self, Self::Sensing)
    }
}

// ============================================================================
// BridgeStatus
// ============================================================================

/// Counters the controller publishes for other tasks to read.
#[derive(Debug, Default)]
pub struct BridgeStatus {
    listeners: AtomicUsize,
    sensing: AtomicBool,
}

impl BridgeStatus {
    /// Listeners the bridge believes the page has.
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::Acquire)
    }

    /// Current sensing state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SensingState {
        if self.sensing.load(Ordering::Acquire) {
            SensingState::Sensing
        } else {
            SensingState::Idle
        }
    }

    fn publish(&self, count: usize, state: SensingState) {
        self.listeners.store(count, Ordering::Release);
        self.sensing.store(state.is_sensing(), Ordering::Release);
    }
}

// ============================================================================
// BridgeController
// ============================================================================

/// Listener accounting and sensing control for one web view.
pub struct BridgeController<P, V> {
    /// Identifies this bridge in logs.
    id: Uuid,
    provider: P,
    view: V,
    options: BridgeOptions,
    listener_count: usize,
    state: SensingState,
    status: Arc<BridgeStatus>,
}

impl<P, V> fmt::Debug for BridgeController<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeController")
            .field("id", &self.id)
            .field("listener_count", &self.listener_count)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BridgeController - Construction
// ============================================================================

impl<P, V> BridgeController<P, V>
where
    P: LocationProvider,
    V: WebView,
{
    /// Creates an idle controller with no listeners.
    ///
    /// Sensing always starts idle, whatever the provider's current state.
    #[must_use]
    pub fn new(provider: P, view: V, options: BridgeOptions) -> Self {
        let id = Uuid::new_v4();
        debug!(
            bridge_id = %id,
            services_enabled = provider.location_services_enabled(),
            authorization = %provider.authorization_status(),
            "Bridge created"
        );

        Self {
            id,
            provider,
            view,
            options,
            listener_count: 0,
            state: SensingState::Idle,
            status: Arc::new(BridgeStatus::default()),
        }
    }

    /// Injects the shim script into the view.
    ///
    /// # Errors
    ///
    /// Returns the view's error if injection fails.
    pub fn install(&self) -> Result<()> {
        let script = self.options.user_script();
        self.view.inject_user_script(&script)?;
        debug!(
            bridge_id = %self.id,
            injection_time = ?script.injection_time,
            main_frame_only = script.main_frame_only,
            "Shim script installed"
        );
        Ok(())
    }
}

// ============================================================================
// BridgeController - Accessors
// ============================================================================

impl<P, V> BridgeController<P, V> {
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
        self.listener_count
    }

    /// Current sensing state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SensingState {
        self.state
    }

    /// Configuration in effect.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// The location provider.
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The web view.
    #[inline]
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Shared status readable from other tasks.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Arc<BridgeStatus> {
        Arc::clone(&self.status)
    }
}

// ============================================================================
// BridgeController - Inputs
// ============================================================================

impl<P, V> BridgeController<P, V>
where
    P: LocationProvider,
    V: WebView,
{
    /// Handles a notification from the page shim.
    pub fn handle_message(&mut self, message: ShimMessage) {
        trace!(bridge_id = %self.id, message = %message, "Shim message");

        match message {
            ShimMessage::ListenerAdded => {
                self.listener_count += 1;
                self.publish();
                self.decide(true);
            }

            ShimMessage::ListenerRemoved => {
                if self.listener_count == 0 {
                    warn!(bridge_id = %self.id, "listenerRemoved with no listeners");
                }
                self.listener_count = self.listener_count.saturating_sub(1);
                if self.listener_count == 0 {
                    self.stop_sensing();
                }
                self.publish();
            }

            ShimMessage::ListenersReset => {
                self.reset();
            }

            ShimMessage::LocationHandler(body) if body == GET_CURRENT_POSITION => {
                self.answer_from_cache();
            }

            ShimMessage::LocationHandler(body) => {
                warn!(bridge_id = %self.id, body = %body, "Unhandled locationHandler body");
            }
        }
    }

    /// Handles a callback from the location provider.
    pub fn handle_provider_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::Location(sample) => {
                if self.state.is_sensing() {
                    self.push(ScriptCall::Success(sample));
                } else {
                    debug!(bridge_id = %self.id, "Dropped location update while idle");
                }
            }

            ProviderEvent::Failure(description) => {
                debug!(bridge_id = %self.id, description = %description, "Location failure");
                self.push(ScriptCall::error(
                    ErrorCode::PositionUnavailable,
                    format!("Failed to get position ({description})"),
                ));
            }

            ProviderEvent::AuthorizationChanged(status) => {
                debug!(
                    bridge_id = %self.id,
                    authorization = %status,
                    listeners = self.listener_count,
                    "Authorization changed"
                );
                if self.listener_count > 0 {
                    self.decide(false);
                }
            }
        }
    }

    /// Forgets every listener and stops sensing.
    ///
    /// Used when the page reports a reset or goes away.
    pub fn reset(&mut self) {
        self.listener_count = 0;
        self.stop_sensing();
        self.publish();
    }

    /// Stops sensing before the controller is dropped.
    pub fn shutdown(&mut self) {
        self.stop_sensing();
        self.publish();
        debug!(bridge_id = %self.id, "Bridge shut down");
    }
}

// ============================================================================
// BridgeController - Internal
// ============================================================================

impl<P, V> BridgeController<P, V>
where
    P: LocationProvider,
    V: WebView,
{
    /// Runs the permission decision against fresh provider state.
    fn decide(&mut self, may_request: bool) {
        if !self.provider.location_services_enabled() {
            self.stop_sensing();
            self.push(ScriptCall::error(
                ErrorCode::PositionUnavailable,
                SERVICES_DISABLED_MESSAGE,
            ));
            return;
        }

        match self.provider.authorization_status() {
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                self.stop_sensing();
                self.push(ScriptCall::error(
                    ErrorCode::PermissionDenied,
                    PERMISSION_DENIED_MESSAGE,
                ));
            }

            AuthorizationStatus::NotDetermined => {
                self.stop_sensing();
                if may_request {
                    let kind = self.options.authorization_kind;
                    debug!(bridge_id = %self.id, ?kind, "Requesting authorization");
                    self.provider.request_authorization(kind);
                }
            }

            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse => {
                self.start_sensing();
            }
        }
    }

    /// Pushes the provider's cached fix for `getCurrentPosition`.
    fn answer_from_cache(&mut self) {
        if !self.provider.location_services_enabled()
            || !self.provider.authorization_status().is_granted()
        {
            return;
        }

        match self.provider.last_known_location() {
            Some(sample) => {
                trace!(bridge_id = %self.id, "Answering from last known location");
                self.push(ScriptCall::Success(sample));
            }
            None => trace!(bridge_id = %self.id, "No cached location"),
        }
    }

    fn start_sensing(&mut self) {
        if self.state.is_sensing() {
            return;
        }
        let accuracy = self.options.desired_accuracy;
        self.provider.start_updating_location(accuracy);
        self.state = SensingState::Sensing;
        self.publish();
        debug!(bridge_id = %self.id, ?accuracy, "Sensing started");
    }

    fn stop_sensing(&mut self) {
        if !self.state.is_sensing() {
            return;
        }
        self.provider.stop_updating_location();
        self.state = SensingState::Idle;
        self.publish();
        debug!(bridge_id = %self.id, "Sensing stopped");
    }

    fn push(&self, call: ScriptCall) {
        if let Err(e) = self.view.evaluate(&call) {
            warn!(bridge_id = %self.id, error = %e, "Failed to evaluate script call");
        }
    }

    fn publish(&self) {
        self.status.publish(self.listener_count, self.state);
    }
}

// ============================================================================
// Tests
// ============================================================================
