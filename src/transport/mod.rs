//! Channels between the page, the bridge and the location provider.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ShimMessage     ┌─────────────────┐
//! │  Page (shim)    │───────────────────►│  Bridge         │
//! │                 │                    │                 │
//! │  Geolocation    │◄───────────────────│  Controller     │
//! └─────────────────┘     ScriptCall     └────────▲────────┘
//!                                                 │ ProviderEvent
//!                                        ┌────────┴────────┐
//!                                        │  Location       │
//!                                        │  Provider       │
//!                                        └─────────────────┘
//! ```
//!
//! Every arrow is fire-and-forget: senders never wait for handling.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | One-way channels and their aliases |
//! | `page` | In-process page and its web view |

// ============================================================================
// Submodules
// ============================================================================

/// One-way channels.
pub mod channel;

/// In-process page.
pub mod page;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{
    MessageReceiver, MessageSender, Outbox, ProviderReceiver, ProviderSender, ScriptReceiver,
    ScriptSender, channel,
};
pub use page::{PageView, ScriptEnvironment};
