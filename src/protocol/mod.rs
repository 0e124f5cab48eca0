//! Bridge protocol message types.
//!
//! This module defines everything that crosses the boundary between the
//! page (shim) and the host (bridge).
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `ShimMessage` | Page → Host | Listener bookkeeping, fast-path request |
//! | `ScriptCall` | Host → Page | Deliver a position or an error |
//!
//! Both directions are one-way and fire-and-forget: nothing is
//! acknowledged and nothing waits for a reply.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | Shim notifications and their envelope |
//! | `position` | Samples, positions, error codes |
//! | `script` | Host → page script calls |

// ============================================================================
// Submodules
// ============================================================================

/// Shim → bridge notifications.
pub mod message;

/// Position and error values.
pub mod position;

/// Bridge → shim script calls.
pub mod script;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::ShimMessage;
pub use position::{
    Coordinates, ErrorCode, Position, PositionError, PositionSample, now_millis, parse_timestamp,
};
pub use script::ScriptCall;
