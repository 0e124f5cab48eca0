//! Native side of the geolocation bridge.
//!
//! The bridge counts the page's listeners, drives a [`LocationProvider`],
//! and pushes results into a [`WebView`].
//!
//! # Example
//!
//! ```ignore
//! use webview_geolocation::Bridge;
//! use webview_geolocation::transport::channel;
//!
//! let (messages_tx, messages_rx) = channel();
//! let (events_tx, events_rx) = channel();
//!
//! let bridge = Bridge::builder().build(provider, view)?;
//! let handle = bridge.spawn(messages_rx, events_rx);
//! // hand messages_tx to the page's script message handlers,
//! // events_tx to the provider delegate
//! handle.stop().await;
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent configuration.
pub mod builder;

/// Listener accounting and sensing control.
pub mod controller;

/// Runner task and its handle.
pub mod runner;

/// Location provider seam.
pub mod provider;

/// Web view seam.
pub mod view;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{BridgeBuilder, BridgeOptions};
pub use controller::{BridgeController, BridgeStatus, SensingState};
pub use runner::{Bridge, BridgeHandle};
pub use provider::{
    AuthorizationKind, AuthorizationStatus, DesiredAccuracy, LocationProvider, ProviderEvent,
};
pub use view::WebView;
