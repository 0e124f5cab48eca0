//! Error types for the geolocation bridge.
//!
//! These are host-side errors: misconfiguration, malformed messages from the
//! page and failures reported by the web view. Errors that page code sees
//! (`PERMISSION_DENIED`, `POSITION_UNAVAILABLE`, `TIMEOUT`) are not part of
//! this enum; they travel to the page as [`PositionError`] values.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Protocol | [`Error::UnknownMessage`], [`Error::Protocol`] |
//! | Web view | [`Error::ScriptEvaluation`], [`Error::ChannelClosed`] |
//! | External | [`Error::Json`], [`Error::Url`] |
//!
//! [`PositionError`]: crate::protocol::PositionError

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned by [`BridgeBuilder::build`](crate::BridgeBuilder::build)
    /// when the bridge options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// A message handler name the bridge does not know.
    #[error("Unknown message handler: {name}")]
    UnknownMessage {
        /// The handler name posted by the page.
        name: String,
    },

    /// Malformed message envelope or payload.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Web View Errors
    // ========================================================================
    /// The web view failed to evaluate a script.
    #[error("Script evaluation failed: {message}")]
    ScriptEvaluation {
        /// Error message reported by the web view.
        message: String,
    },

    /// The other side of a channel has gone away.
    #[error("Channel closed")]
    ChannelClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unknown message error.
    #[inline]
    pub fn unknown_message(name: impl Into<String>) -> Self {
        Self::UnknownMessage { name: name.into() }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a script evaluation error.
    #[inline]
    pub fn script_evaluation(message: impl Into<String>) -> Self {
        Self::ScriptEvaluation {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the error means the peer is gone.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(self, Self::ChannelClosed)
    }

    /// Returns `true` if this is a protocol error.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMessage { .. } | Self::Protocol { .. } | Self::Json(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
