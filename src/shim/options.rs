//! Options accepted by `getCurrentPosition` and `watchPosition`.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use webview_geolocation::PositionOptions;
//!
//! let options = PositionOptions::new()
//!     .with_high_accuracy()
//!     .with_timeout(Duration::from_secs(5));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// PositionOptions
// ============================================================================

/// Per-request options, shaped like the web `PositionOptions` dictionary.
///
/// Only `timeout` changes shim behavior. Accuracy is chosen by the host
/// for all listeners at once, and the host's last known fix is offered to
/// one-shot requests regardless of `maximum_age`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionOptions {
    /// Ask for the most accurate fix available.
    pub enable_high_accuracy: bool,

    /// Give up with `TIMEOUT` if nothing was delivered in this time.
    ///
    /// `None` waits forever.
    #[serde(with = "millis")]
    pub timeout: Option<Duration>,

    /// Maximum age of a cached fix the caller will accept.
    #[serde(with = "millis_required")]
    pub maximum_age: Duration,
}

impl PositionOptions {
    /// Options with web platform defaults: low accuracy, no timeout,
    /// no cached fixes.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enable_high_accuracy: false,
            timeout: None,
            maximum_age: Duration::ZERO,
        }
    }

    /// Requests high accuracy.
    #[inline]
    #[must_use]
    pub fn with_high_accuracy(mut self) -> Self {
        self.enable_high_accuracy = true;
        self
    }

    /// Sets the timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum acceptable age of a cached fix.
    #[inline]
    #[must_use]
    pub fn with_maximum_age(mut self, maximum_age: Duration) -> Self {
        self.maximum_age = maximum_age;
        self
    }
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// `Option<Duration>` as optional milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => s.serialize_some(&(duration.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

/// `Duration` as milliseconds.
mod millis_required {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// ============================================================================
// Tests
// ============================================================================
