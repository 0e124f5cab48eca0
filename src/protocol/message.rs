//! Notifications posted by the shim to the bridge.
//!
//! On a real web view these arrive through named script message handlers
//! (`window.webkit.messageHandlers.<name>.postMessage(body)`), so the wire
//! form is a `{ "name": ..., "body": ... }` envelope.
//!
//! # Handlers
//!
//! | Name | Body | Meaning |
//! |------|------|---------|
//! | `listenerAdded` | `""` | A listener was registered |
//! | `listenerRemoved` | `""` | A watch was cleared or timed out |
//! | `listenersReset` | `""` | An error broadcast emptied the registry |
//! | `locationHandler` | `"getCurrentPosition"` | Ask for the last known fix |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Every handler name the shim posts to. A web view registers one script
/// message handler per entry.
pub const HANDLER_NAMES: [&str; 4] = [
    LISTENER_ADDED,
    LISTENER_REMOVED,
    LISTENERS_RESET,
    LOCATION_HANDLER,
];

/// Handler name for [`ShimMessage::ListenerAdded`].
pub const LISTENER_ADDED: &str = "listenerAdded";
/// Handler name for [`ShimMessage::ListenerRemoved`].
pub const LISTENER_REMOVED: &str = "listenerRemoved";
/// Handler name for [`ShimMessage::ListenersReset`].
pub const LISTENERS_RESET: &str = "listenersReset";
/// Handler name for [`ShimMessage::LocationHandler`].
pub const LOCATION_HANDLER: &str = "locationHandler";

/// Body of the fast-path request posted by `getCurrentPosition`.
pub const GET_CURRENT_POSITION: &str = "getCurrentPosition";

// ============================================================================
// ShimMessage
// ============================================================================

/// A fire-and-forget notification from the page to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "body", rename_all = "camelCase")]
pub enum ShimMessage {
    /// A listener was registered.
    ListenerAdded,
    /// A registered listener went away.
    ListenerRemoved,
    /// The whole registry was cleared.
    ListenersReset,
    /// Advisory request, body is normally `"getCurrentPosition"`.
    LocationHandler(String),
}

impl ShimMessage {
    /// The fast-path request for the last known position.
    #[inline]
    #[must_use]
    pub fn get_current_position() -> Self {
        Self::LocationHandler(GET_CURRENT_POSITION.to_string())
    }

    /// Returns the script message handler name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListenerAdded => LISTENER_ADDED,
            Self::ListenerRemoved => LISTENER_REMOVED,
            Self::ListenersReset => LISTENERS_RESET,
            Self::LocationHandler(_) => LOCATION_HANDLER,
        }
    }

    /// Builds a message from what a web view's script message handler
    /// received.
    ///
    /// Bodies of the payload-less handlers are ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownMessage`] if `name` is not a shim handler
    /// - [`Error::Protocol`] if `locationHandler` carries a non-string body
    pub fn from_envelope(name: &str, body: &Value) -> Result<Self> {
        match name {
            LISTENER_ADDED => Ok(Self::ListenerAdded),
            LISTENER_REMOVED => Ok(Self::ListenerRemoved),
            LISTENERS_RESET => Ok(Self::ListenersReset),
            LOCATION_HANDLER => body
                .as_str()
                .map(|body| Self::LocationHandler(body.to_string()))
                .ok_or_else(|| {
                    Error::protocol(format!("{LOCATION_HANDLER} expects a string body, got {body}"))
                }),
            other => Err(Error::unknown_message(other)),
        }
    }

    /// Parses a JSON envelope `{ "name": ..., "body": ... }`.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if `text` is not JSON
    /// - [`Error::Protocol`] if `name` is missing
    /// - anything [`ShimMessage::from_envelope`] returns
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol("message envelope has no name"))?;
        let body = value.get("body").unwrap_or(&Value::Null);
        Self::from_envelope(name, body)
    }
}

impl fmt::Display for ShimMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationHandler(body) => write!(f, "{}({body})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_envelope_known_names() {
        assert_eq!(
            ShimMessage::from_envelope("listenerAdded", &json!("")).expect("parse"),
            ShimMessage::ListenerAdded
        );
        assert_eq!(
            ShimMessage::from_envelope("listenerRemoved", &json!("")).expect("parse"),
            ShimMessage::ListenerRemoved
        );
        assert_eq!(
            ShimMessage::from_envelope("listenersReset", &Value::Null).expect("parse"),
            ShimMessage::ListenersReset
        );
        assert_eq!(
            ShimMessage::from_envelope("locationHandler", &json!("getCurrentPosition"))
                .expect("parse"),
            ShimMessage::get_current_position()
        );
    }

    #[test]
    fn test_from_envelope_unknown_name() {
        let err = ShimMessage::from_envelope("somethingElse", &json!("")).unwrap_err();
        assert!(matches!(err, Error::UnknownMessage { ref name } if name == "somethingElse"));
    }

    #[test]
    fn test_location_handler_requires_string() {
        let err = ShimMessage::from_envelope("locationHandler", &json!(5)).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_from_json() {
        let msg =
            ShimMessage::from_json(r#"{"name":"locationHandler","body":"getCurrentPosition"}"#)
                .expect("parse");
        assert_eq!(msg, ShimMessage::get_current_position());
    }

    #[test]
    fn test_from_json_without_name() {
        let err = ShimMessage::from_json(r#"{"body":""}"#).unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_serialize_envelope() {
        let json = serde_json::to_value(ShimMessage::get_current_position()).expect("serialize");
        assert_eq!(json, json!({ "name": "locationHandler", "body": "getCurrentPosition" }));

        let json = serde_json::to_value(ShimMessage::ListenerAdded).expect("serialize");
        assert_eq!(json["name"], "listenerAdded");
    }

    #[test]
    fn test_handler_names_match_messages() {
        for name in HANDLER_NAMES {
            let msg =
                ShimMessage::from_envelope(name, &json!("getCurrentPosition")).expect("parse");
            assert_eq!(msg.name(), name);
        }
    }
}
