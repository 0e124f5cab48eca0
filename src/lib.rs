//! WebView Geolocation - native location services for embedded web pages.
//!
//! Pages inside an embedded browser view call the standard
//! `navigator.geolocation` API; this library answers them from the host's
//! location services.
//!
//! # Architecture
//!
//! The bridge has two halves that only talk through one-way messages:
//!
//! - **Page (shim)**: replaces `navigator.geolocation`, keeps the listener
//!   registry, and fans results out to callbacks
//! - **Host (bridge)**: counts listeners, asks for permission, starts and
//!   stops sensing, and pushes results back into the page
//!
//! Key design principles:
//!
//! - Broadcast delivery: every result goes to every registered listener
//! - Sensing runs only while the page has listeners
//! - Permission is re-queried from the provider at each decision
//! - Nothing on either side waits for the other
//!
//! # Quick Start
//!
//! ```ignore
//! use webview_geolocation::{Bridge, PositionOptions, Result};
//! use webview_geolocation::transport::{ScriptEnvironment, channel};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (messages_tx, messages_rx) = channel();
//!     let (events_tx, events_rx) = channel();
//!
//!     // In-process page; real hosts inject the JavaScript shim instead
//!     let (page, view) = ScriptEnvironment::new(messages_tx);
//!     let geolocation = page.geolocation();
//!     let _page_task = page.spawn();
//!
//!     let bridge = Bridge::builder().build(MyProvider::new(events_tx), view)?;
//!     let handle = bridge.spawn(messages_rx, events_rx);
//!
//!     geolocation.watch_position(
//!         |position| println!("{:?}", position.coords),
//!         |error| eprintln!("{error}"),
//!         PositionOptions::default(),
//!     );
//!
//!     // ... later, when the page goes away
//!     handle.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Host side: controller, runner, provider and view seams |
//! | [`shim`] | Page side: [`Geolocation`], listener registry, JavaScript asset |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Messages, script calls and position types |
//! | [`transport`] | Channels and the in-process page |

// ============================================================================
// Modules
// ============================================================================

/// Host side of the bridge.
///
/// Use [`Bridge::builder()`] to create a configured bridge.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire types shared by both halves.
pub mod protocol;

/// Page side of the bridge.
pub mod shim;

/// Channels between the page, the bridge and the provider.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{
    AuthorizationKind, AuthorizationStatus, Bridge, BridgeBuilder, BridgeHandle, BridgeOptions,
    DesiredAccuracy, LocationProvider, ProviderEvent, SensingState, WebView,
};

// Shim types
pub use shim::{Geolocation, InjectionTime, PositionOptions, UserScript};

// Protocol types
pub use protocol::{
    Coordinates, ErrorCode, Position, PositionError, PositionSample, ScriptCall, ShimMessage,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::WatchId;
