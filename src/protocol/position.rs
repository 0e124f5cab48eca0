//! Position and error values exchanged with the page.
//!
//! The host reports a raw [`PositionSample`]; the shim reshapes it into the
//! [`Position`] that web code expects from the geolocation API.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Layout of `Date`'s description on Apple platforms,
/// e.g. `2020-05-01 10:15:30 +0000`.
const APPLE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Same as [`APPLE_DATE_FORMAT`] without an offset, read as UTC.
const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// PositionSample
// ============================================================================

/// A raw location fix as reported by the native provider.
///
/// `heading` and `speed` are negative when the sensor could not determine
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    /// When the fix was taken, in whatever textual form the host produces.
    pub timestamp: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude in meters above sea level.
    pub altitude: f64,
    /// Radius of uncertainty for latitude/longitude, in meters.
    pub horizontal_accuracy: f64,
    /// Uncertainty of the altitude, in meters.
    pub vertical_accuracy: f64,
    /// Course in degrees from true north.
    pub heading: f64,
    /// Ground speed in meters per second.
    pub speed: f64,
}

impl PositionSample {
    /// Creates a sample at the given coordinates with every other field
    /// unknown.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            latitude,
            longitude,
            altitude: 0.0,
            horizontal_accuracy: 0.0,
            vertical_accuracy: -1.0,
            heading: -1.0,
            speed: -1.0,
        }
    }

    /// Sets the altitude and its accuracy.
    #[inline]
    #[must_use]
    pub fn with_altitude(mut self, altitude: f64, vertical_accuracy: f64) -> Self {
        self.altitude = altitude;
        self.vertical_accuracy = vertical_accuracy;
        self
    }

    /// Sets the horizontal accuracy.
    #[inline]
    #[must_use]
    pub fn with_accuracy(mut self, horizontal_accuracy: f64) -> Self {
        self.horizontal_accuracy = horizontal_accuracy;
        self
    }

    /// Sets heading and speed.
    #[inline]
    #[must_use]
    pub fn with_motion(mut self, heading: f64, speed: f64) -> Self {
        self.heading = heading;
        self.speed = speed;
        self
    }

    /// Reshapes the sample into the value handed to success callbacks.
    ///
    /// `now_ms` is used when the timestamp cannot be parsed.
    #[must_use]
    pub fn to_position(&self, now_ms: i64) -> Position {
        Position {
            coords: Coordinates {
                latitude: self.latitude,
                longitude: self.longitude,
                altitude: self.altitude,
                accuracy: self.horizontal_accuracy,
                altitude_accuracy: self.vertical_accuracy,
                heading: positive(self.heading),
                speed: positive(self.speed),
            },
            timestamp: parse_timestamp(&self.timestamp).unwrap_or(now_ms),
        }
    }
}

/// Sensors report "unknown" as zero or a negative value.
#[inline]
fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

// ============================================================================
// Position
// ============================================================================

/// Coordinates of a [`Position`], shaped like the web `GeolocationCoordinates`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude in meters.
    pub altitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f64,
    /// Altitude accuracy in meters.
    pub altitude_accuracy: f64,
    /// Heading in degrees, `None` when unknown.
    pub heading: Option<f64>,
    /// Speed in meters per second, `None` when unknown.
    pub speed: Option<f64>,
}

/// A position delivered to success callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// The coordinates.
    pub coords: Coordinates,
    /// Unix time in milliseconds.
    pub timestamp: i64,
}

// ============================================================================
// ErrorCode
// ============================================================================

/// Geolocation error codes as defined by the web API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    /// The app lacks permission to use location services.
    PermissionDenied = 1,
    /// Location services are off or the fix could not be obtained.
    PositionUnavailable = 2,
    /// No position arrived within the requested timeout.
    Timeout = 3,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Maps a numeric code from the host.
    ///
    /// Unknown codes become [`ErrorCode::PositionUnavailable`].
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }

    /// Returns the constant name web code compares against.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PositionUnavailable => "POSITION_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl From<u16> for ErrorCode {
    #[inline]
    fn from(code: u16) -> Self {
        Self::from_code(code)
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.as_u16()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// PositionError
// ============================================================================

/// An error delivered to error callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
}

impl PositionError {
    /// Creates a new position error.
    #[inline]
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates a `PERMISSION_DENIED` error.
    #[inline]
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Creates a `POSITION_UNAVAILABLE` error.
    #[inline]
    #[must_use]
    pub fn position_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PositionUnavailable, message)
    }

    /// Creates a `TIMEOUT` error.
    #[inline]
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.code.as_u16(), self.message)
    }
}

// ============================================================================
// Timestamp Parsing
// ============================================================================

/// Parses a host timestamp into Unix milliseconds.
///
/// Accepts RFC 3339, the Apple `Date` description layout and a bare
/// millisecond count. Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(millis) = raw.parse::<i64>() {
        return Some(millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, APPLE_DATE_FORMAT) {
        return Some(dt.timestamp_millis());
    }

    NaiveDateTime::parse_from_str(raw, NAIVE_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Current Unix time in milliseconds.
#[inline]
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// ============================================================================
// Tests
// ============================================================================
