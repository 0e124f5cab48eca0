//! Type-safe identifiers.
//!
//! [`WatchId`] identifies a listener registered with the page-side shim.
//! Ids come from a per-shim counter starting at 1 and are never reused by
//! that shim, so a stale id can never match a newer listener.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// WatchId
// ============================================================================

/// Identifier returned by `watchPosition` / `getCurrentPosition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchId(u32);

impl WatchId {
    /// The first id a shim hands out.
    pub const FIRST: Self = Self(1);

    /// Creates an id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the id after this one.
    ///
    /// Wraps back to [`WatchId::FIRST`] after `u32::MAX`; a shim would need
    /// four billion registrations to get there.
    #[inline]
    #[must_use]
    pub(crate) const fn successor(&self) -> Self {
        match self.0.checked_add(1) {
            Some(next) => Self(next),
            None => Self::FIRST,
        }
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WatchId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_increments() {
        assert_eq!(WatchId::FIRST.successor(), WatchId::new(2));
    }

    #[test]
    fn test_successor_wraps_to_first() {
        assert_eq!(WatchId::new(u32::MAX).successor(), WatchId::FIRST);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&WatchId::new(42)).expect("serialize");
        assert_eq!(json, "42");
    }

    #[test]
    fn test_display() {
        assert_eq!(WatchId::new(7).to_string(), "7");
    }
}
