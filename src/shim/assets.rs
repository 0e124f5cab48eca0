//! JavaScript polyfill injected into real web views.
//!
//! The script replaces `navigator.geolocation.getCurrentPosition`,
//! `watchPosition` and `clearWatch`, and installs
//! `navigator.geolocation.helper` with the `success` / `error` entry points
//! the bridge evaluates. It follows the same rules as the Rust
//! [`Geolocation`](super::Geolocation) shim.
//!
//! # Injection
//!
//! 1. The host registers one script message handler per
//!    [`HANDLER_NAMES`](crate::protocol::message::HANDLER_NAMES) entry
//! 2. The bridge injects [`UserScript::shim`] at document end, main frame only
//! 3. Page code calls the standard API; the shim posts notifications
//! 4. The bridge evaluates `navigator.geolocation.helper.*` calls

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::protocol::message::{
    GET_CURRENT_POSITION, LISTENER_ADDED, LISTENER_REMOVED, LISTENERS_RESET, LOCATION_HANDLER,
};

// ============================================================================
// Constants
// ============================================================================

/// Where WebKit exposes script message handlers.
pub const WEBKIT_HANDLER_ROOT: &str = "window.webkit.messageHandlers";

// ============================================================================
// InjectionTime
// ============================================================================

/// When a user script runs relative to page loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InjectionTime {
    /// Before any page script runs.
    DocumentStart,
    /// After the document finished parsing.
    #[default]
    DocumentEnd,
}

// ============================================================================
// UserScript
// ============================================================================

/// A script the web view runs once per page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScript {
    /// JavaScript source.
    pub source: String,
    /// When to run it.
    pub injection_time: InjectionTime,
    /// Skip iframes.
    pub main_frame_only: bool,
}

impl UserScript {
    /// Builds the geolocation shim script.
    ///
    /// # Arguments
    ///
    /// * `handler_root` - JavaScript expression holding the message
    ///   handlers, e.g. [`WEBKIT_HANDLER_ROOT`]
    /// * `injection_time` - When the web view should run the script
    /// * `main_frame_only` - Whether iframes are skipped
    #[must_use]
    pub fn shim(handler_root: &str, injection_time: InjectionTime, main_frame_only: bool) -> Self {
        Self {
            source: build_shim_source(handler_root),
            injection_time,
            main_frame_only,
        }
    }
}

impl Default for UserScript {
    fn default() -> Self {
        Self::shim(WEBKIT_HANDLER_ROOT, InjectionTime::DocumentEnd, true)
    }
}

// ============================================================================
// Internal Functions
// ============================================================================

/// Fills the shim template.
fn build_shim_source(handler_root: &str) -> String {
    SHIM_TEMPLATE
        .replace("$HANDLER_ROOT", handler_root)
        .replace("$LISTENER_ADDED", LISTENER_ADDED)
        .replace("$LISTENER_REMOVED", LISTENER_REMOVED)
        .replace("$LISTENERS_RESET", LISTENERS_RESET)
        .replace("$LOCATION_HANDLER", LOCATION_HANDLER)
        .replace("$GET_CURRENT_POSITION", GET_CURRENT_POSITION)
}

// ============================================================================
// Templates
// ============================================================================

/// Polyfill source. `$NAME` placeholders are filled by [`build_shim_source`].
const SHIM_TEMPLATE: &str = r##"(function () {
    if (!navigator.geolocation) {
        Object.defineProperty(navigator, 'geolocation', { value: {}, configurable: true });
    }
    var geolocation = navigator.geolocation;
    if (geolocation.helper) {
        return;
    }

    function noop() {}

    function post(name, body) {
        try {
            $HANDLER_ROOT[name].postMessage(body);
        } catch (e) {}
    }

    function orNull(value) {
        return value > 0 ? value : null;
    }

    var helper = {
        nextId: 1,
        listeners: {},

        id: function () {
            var id = this.nextId;
            this.nextId += 1;
            return id;
        },

        register: function (onetime, success, error, options) {
            var id = this.id();
            var listener = { onetime: onetime, success: success || noop, error: error || noop, timer: null };
            this.listeners[id] = listener;
            post('$LISTENER_ADDED', '');

            var timeout = options && options.timeout;
            if (typeof timeout === 'number' && isFinite(timeout) && timeout >= 0) {
                listener.timer = setTimeout(function () { helper.expire(id); }, timeout);
            }
            return id;
        },

        remove: function (id) {
            var listener = this.listeners[id];
            if (!listener) {
                return false;
            }
            if (listener.timer !== null) {
                clearTimeout(listener.timer);
            }
            delete this.listeners[id];
            return true;
        },

        expire: function (id) {
            var listener = this.listeners[id];
            if (!listener) {
                return;
            }
            listener.timer = null;
            if (listener.onetime) {
                delete this.listeners[id];
            }
            listener.error({ code: 3, message: 'Timeout expired', PERMISSION_DENIED: 1, POSITION_UNAVAILABLE: 2, TIMEOUT: 3 });
            if (listener.onetime) {
                post('$LISTENER_REMOVED', '');
            }
        },

        success: function (timestamp, latitude, longitude, altitude, accuracy, altitudeAccuracy, heading, speed) {
            var time = new Date(timestamp).getTime();
            if (isNaN(time)) {
                time = /^-?\d+$/.test(String(timestamp)) ? Number(timestamp) : Date.now();
            }
            var position = {
                timestamp: time,
                coords: {
                    latitude: latitude,
                    longitude: longitude,
                    altitude: altitude,
                    accuracy: accuracy,
                    altitudeAccuracy: altitudeAccuracy,
                    heading: orNull(heading),
                    speed: orNull(speed)
                }
            };

            var targets = [];
            for (var id in this.listeners) {
                var listener = this.listeners[id];
                if (listener.timer !== null) {
                    clearTimeout(listener.timer);
                    listener.timer = null;
                }
                targets.push([id, listener]);
            }
            targets.forEach(function (target) { target[1].success(position); });
            targets.forEach(function (target) {
                if (target[1].onetime && helper.listeners[target[0]] === target[1]) {
                    delete helper.listeners[target[0]];
                    post('$LISTENER_REMOVED', '');
                }
            });
        },

        error: function (code, message) {
            var error = { code: code, message: message, PERMISSION_DENIED: 1, POSITION_UNAVAILABLE: 2, TIMEOUT: 3 };
            var targets = [];
            for (var id in this.listeners) {
                targets.push(this.listeners[id]);
                this.remove(id);
            }
            if (targets.length > 0) {
                post('$LISTENERS_RESET', '');
            }
            targets.forEach(function (listener) { listener.error(error); });
        }
    };

    geolocation.helper = helper;

    geolocation.getCurrentPosition = function (success, error, options) {
        var id = helper.register(true, success, error, options);
        post('$LOCATION_HANDLER', '$GET_CURRENT_POSITION');
        return id;
    };

    geolocation.watchPosition = function (success, error, options) {
        return helper.register(false, success, error, options);
    };

    geolocation.clearWatch = function (id) {
        if (helper.remove(id)) {
            post('$LISTENER_REMOVED', '');
        }
    };
})();
"##;

// ============================================================================
// Tests
// ============================================================================
