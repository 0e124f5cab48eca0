//! Script calls pushed by the bridge into the page.
//!
//! A real web view receives these as JavaScript evaluated against the
//! shim's helper object; an in-process page receives the typed value.

// ============================================================================
// Imports
// ============================================================================

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::position::{ErrorCode, PositionSample};

// ============================================================================
// Constants
// ============================================================================

/// Global path of the shim's host-facing entry points.
pub const HELPER_PATH: &str = "navigator.geolocation.helper";

// ============================================================================
// ScriptCall
// ============================================================================

/// An invocation of one of the shim's host entry points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum ScriptCall {
    /// `helper.success(timestamp, lat, lon, alt, hAcc, vAcc, heading, speed)`.
    Success(PositionSample),
    /// `helper.error(code, message)`.
    Error {
        /// Numeric error code.
        code: u16,
        /// Human-readable description.
        message: String,
    },
}

impl ScriptCall {
    /// Creates an error call.
    #[inline]
    #[must_use]
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.as_u16(),
            message: message.into(),
        }
    }

    /// Renders the call as JavaScript source.
    #[must_use]
    pub fn to_script(&self) -> String {
        match self {
            Self::Success(sample) => {
                let mut script = format!("{HELPER_PATH}.success({}", js_string(&sample.timestamp));
                for value in [
                    sample.latitude,
                    sample.longitude,
                    sample.altitude,
                    sample.horizontal_accuracy,
                    sample.vertical_accuracy,
                    sample.heading,
                    sample.speed,
                ] {
                    let _ = write!(script, ", {}", js_number(value));
                }
                script.push_str(");");
                script
            }
            Self::Error { code, message } => {
                format!("{HELPER_PATH}.error({code}, {});", js_string(message))
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escapes a string for safe use in JavaScript.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

/// Formats a number as a JavaScript literal.
fn js_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
