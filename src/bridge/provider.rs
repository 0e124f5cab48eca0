//! Native location provider seam.
//!
//! The bridge never talks to sensors directly. It drives a
//! [`LocationProvider`] and receives its callbacks as [`ProviderEvent`]s
//! over a [`ProviderSender`](crate::transport::ProviderSender).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::PositionSample;

// ============================================================================
// AuthorizationStatus
// ============================================================================

/// The app's current permission to use location services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    NotDetermined,
    /// Location use is blocked by policy.
    Restricted,
    /// The user refused.
    Denied,
    /// Allowed at any time.
    AuthorizedAlways,
    /// Allowed while the app is in use.
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    /// Returns `true` for either authorized state.
    #[inline]
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::AuthorizedAlways | Self::AuthorizedWhenInUse)
    }

    /// Returns `true` for denied or restricted.
    #[inline]
    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotDetermined => "notDetermined",
            Self::Restricted => "restricted",
            Self::Denied => "denied",
            Self::AuthorizedAlways => "authorizedAlways",
            Self::AuthorizedWhenInUse => "authorizedWhenInUse",
        };
        f.write_str(name)
    }
}

// ============================================================================
// AuthorizationKind
// ============================================================================

/// Which permission to ask for when the status is undetermined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationKind {
    /// Only while the app is in use.
    #[default]
    WhenInUse,
    /// Also in the background.
    Always,
}

// ============================================================================
// DesiredAccuracy
// ============================================================================

/// Accuracy requested from the sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DesiredAccuracy {
    /// Best the hardware can do.
    #[default]
    Best,
    /// Within about ten meters.
    NearestTenMeters,
    /// Within about a hundred meters.
    HundredMeters,
    /// Within about a kilometer.
    Kilometer,
}

// ============================================================================
// ProviderEvent
// ============================================================================

/// Callbacks from the native provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// A new fix. Only the latest is reported.
    Location(PositionSample),
    /// Sensing failed; carries the platform's description.
    Failure(String),
    /// The authorization status changed.
    AuthorizationChanged(AuthorizationStatus),
}

// ============================================================================
// LocationProvider
// ============================================================================

/// Host location services.
///
/// Actions are asynchronous: results arrive later as [`ProviderEvent`]s.
pub trait LocationProvider: Send + 'static {
    /// Starts delivering [`ProviderEvent::Location`] updates.
    fn start_updating_location(&mut self, accuracy: DesiredAccuracy);

    /// Stops location updates.
    fn stop_updating_location(&mut self);

    /// Whether location services are enabled system-wide.
    fn location_services_enabled(&self) -> bool;

    /// Current authorization status.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Asks the user for permission. The answer arrives as
    /// [`ProviderEvent::AuthorizationChanged`].
    fn request_authorization(&mut self, kind: AuthorizationKind);

    /// Most recent fix the provider has cached, if any.
    fn last_known_location(&self) -> Option<PositionSample> {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
