//! The injected JavaScript shim, run in an embedded engine.
//!
//! A stub page provides `navigator`, timers and a handler root that records
//! every post, so the shim's registry and notifications can be observed.

use rquickjs::{Context, Runtime, Value};
use serde_json::json;
use webview_geolocation::protocol::message::HANDLER_NAMES;
use webview_geolocation::transport::channel;
use webview_geolocation::{
    ErrorCode, Geolocation, InjectionTime, Position, PositionOptions, PositionSample, ScriptCall,
    UserScript,
};

// ============================================================================
// Page Fixture
// ============================================================================

/// Browser globals the shim relies on. Timers only fire on `runTimers()`.
const PAGE_STUB: &str = r#"
var window = globalThis;
var navigator = {};
var posted = [];
var timers = {};
var nextTimer = 1;

function setTimeout(callback, delay) {
    var handle = nextTimer++;
    timers[handle] = callback;
    return handle;
}

function clearTimeout(handle) {
    delete timers[handle];
}

function runTimers() {
    var due = timers;
    timers = {};
    for (var handle in due) {
        due[handle]();
    }
}

function pendingTimers() {
    return Object.keys(timers).length;
}

function listenerCount() {
    return Object.keys(navigator.geolocation.helper.listeners).length;
}

window.host = {};
HANDLER_NAMES.forEach(function (name) {
    window.host[name] = {
        postMessage: function (body) {
            posted.push(body ? name + ':' + body : name);
        }
    };
});
"#;

struct Page {
    context: Context,
    _runtime: Runtime,
}

impl Page {
    fn new() -> Self {
        let runtime = Runtime::new().expect("runtime");
        let context = Context::full(&runtime).expect("context");
        let page = Self {
            context,
            _runtime: runtime,
        };

        let names = serde_json::to_string(&HANDLER_NAMES).expect("names");
        page.run(&format!("var HANDLER_NAMES = {names};\n{PAGE_STUB}"));
        page.inject();
        page
    }

    fn inject(&self) {
        let script = UserScript::shim("window.host", InjectionTime::DocumentEnd, true);
        self.run(&script.source);
    }

    fn run(&self, source: &str) {
        self.context.with(|ctx| {
            let _: Value = ctx.eval(source).expect("script");
        });
    }

    /// Runs `body` as a function and returns its result as JSON.
    fn eval(&self, body: &str) -> serde_json::Value {
        let source = format!("JSON.stringify((function () {{\n{body}\n}})())");
        let json: String = self
            .context
            .with(|ctx| ctx.eval(source.as_str()).expect("script"));
        serde_json::from_str(&json).expect("json")
    }
}

// ============================================================================
// Success
// ============================================================================

#[test]
fn test_success_broadcasts_and_prunes_one_shots() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var log = [];
        var stamps = [];
        navigator.geolocation.watchPosition(function (p) {
            log.push(['watch', p.coords.heading, p.coords.speed]);
            stamps.push(p.timestamp);
        });
        navigator.geolocation.getCurrentPosition(function () { log.push(['once']); });

        var before = Date.now();
        navigator.geolocation.helper.success('garbage', 1, 2, 3, 4, 5, 0, -1);
        var afterFirst = listenerCount();
        navigator.geolocation.helper.success('garbage', 1, 2, 3, 4, 5, 0, -1);

        return {
            log: log,
            afterFirst: afterFirst,
            fresh: stamps.every(function (t) { return typeof t === 'number' && t >= before; }),
            posted: posted
        };
        "#,
    );

    assert_eq!(
        result["log"],
        json!([["watch", null, null], ["once"], ["watch", null, null]])
    );
    assert_eq!(result["afterFirst"], 1);
    assert_eq!(result["fresh"], true);
    assert_eq!(
        result["posted"],
        json!([
            "listenerAdded",
            "listenerAdded",
            "locationHandler:getCurrentPosition",
            "listenerRemoved"
        ])
    );
}

#[test]
fn test_each_pruned_one_shot_posts_removal() {
    let page = Page::new();

    let result = page.eval(
        r#"
        for (var i = 0; i < 3; i++) {
            navigator.geolocation.getCurrentPosition(function () {});
        }
        posted.length = 0;
        navigator.geolocation.helper.success('2023-11-14T22:13:20Z', 1, 2, 0, 0, -1, -1, -1);
        return { listeners: listenerCount(), posted: posted };
        "#,
    );

    assert_eq!(result["listeners"], 0);
    assert_eq!(
        result["posted"],
        json!(["listenerRemoved", "listenerRemoved", "listenerRemoved"])
    );
}

#[test]
fn test_one_shot_added_during_delivery_is_kept() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var calls = 0;
        navigator.geolocation.getCurrentPosition(function () {
            calls += 1;
            navigator.geolocation.getCurrentPosition(function () { calls += 10; });
        });
        navigator.geolocation.helper.success('garbage', 1, 2, 0, 0, -1, -1, -1);
        return { calls: calls, listeners: listenerCount() };
        "#,
    );

    assert_eq!(result, json!({ "calls": 1, "listeners": 1 }));
}

#[test]
fn test_rendered_success_matches_rust_shim() {
    let sample = PositionSample::new("2020-05-01T10:00:00Z", 3.139, 101.6869)
        .with_altitude(12.5, 3.0)
        .with_accuracy(5.0)
        .with_motion(90.0, 0.0);

    let (outbox, _inbox) = channel();
    let geolocation = Geolocation::new(outbox);
    let delivered = std::sync::Arc::new(parking_lot::Mutex::new(None));
    let sink = std::sync::Arc::clone(&delivered);
    geolocation.watch_position(
        move |position| *sink.lock() = Some(*position),
        |_| {},
        PositionOptions::default(),
    );
    geolocation.success(&sample);
    let expected = delivered.lock().take().expect("rust delivery");

    let page = Page::new();
    page.run(
        "var seen = []; navigator.geolocation.watchPosition(function (p) { seen.push(p); });",
    );
    page.run(&ScriptCall::Success(sample).to_script());
    let seen = page.eval("return seen;");

    let positions: Vec<Position> = serde_json::from_value(seen).expect("positions");
    assert_eq!(positions, vec![expected]);
    assert_eq!(expected.coords.heading, Some(90.0));
    assert_eq!(expected.coords.speed, None);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_clears_everything_and_posts_one_reset() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var errors = [];
        function record(e) { errors.push([e.code, e.message, e.PERMISSION_DENIED]); }
        navigator.geolocation.watchPosition(null, record);
        navigator.geolocation.getCurrentPosition(null, record);
        navigator.geolocation.watchPosition(null, record);
        posted.length = 0;

        navigator.geolocation.helper.error(1, 'App does not have location permission');
        return { errors: errors, listeners: listenerCount(), posted: posted };
        "#,
    );

    let denied = json!([1, "App does not have location permission", 1]);
    assert_eq!(result["errors"], json!([denied, denied, denied]));
    assert_eq!(result["listeners"], 0);
    assert_eq!(result["posted"], json!(["listenersReset"]));
}

#[test]
fn test_reset_posted_before_error_callbacks_run() {
    let page = Page::new();

    let result = page.eval(
        r#"
        navigator.geolocation.watchPosition(null, function () {
            navigator.geolocation.watchPosition(function () {});
        });
        posted.length = 0;

        navigator.geolocation.helper.error(2, 'Location service disabled');
        return { listeners: listenerCount(), posted: posted };
        "#,
    );

    assert_eq!(result["listeners"], 1);
    assert_eq!(result["posted"], json!(["listenersReset", "listenerAdded"]));
}

#[test]
fn test_rendered_error_without_listeners_posts_nothing() {
    let page = Page::new();

    page.run(&ScriptCall::error(ErrorCode::PositionUnavailable, "Location \"off\"").to_script());

    assert_eq!(page.eval("return posted;"), json!([]));
}

// ============================================================================
// clearWatch
// ============================================================================

#[test]
fn test_clear_watch_ignores_unknown_ids() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var id = navigator.geolocation.watchPosition(function () {});
        navigator.geolocation.clearWatch(999);
        navigator.geolocation.clearWatch(id);
        navigator.geolocation.clearWatch(id);
        return { id: id, listeners: listenerCount(), posted: posted };
        "#,
    );

    assert_eq!(result["id"], 1);
    assert_eq!(result["listeners"], 0);
    assert_eq!(result["posted"], json!(["listenerAdded", "listenerRemoved"]));
}

#[test]
fn test_ids_are_not_reused() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var first = navigator.geolocation.watchPosition(function () {});
        navigator.geolocation.clearWatch(first);
        var second = navigator.geolocation.watchPosition(function () {});
        return [first, second];
        "#,
    );

    assert_eq!(result, json!([1, 2]));
}

// ============================================================================
// Timeouts
// ============================================================================

#[test]
fn test_timeout_expires_one_shot_and_keeps_watch() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var errors = [];
        navigator.geolocation.getCurrentPosition(function () {}, function (e) {
            errors.push(['once', e.code, e.message]);
        }, { timeout: 10 });
        navigator.geolocation.watchPosition(function () {}, function (e) {
            errors.push(['watch', e.code, e.message]);
        }, { timeout: 10 });
        navigator.geolocation.getCurrentPosition(function () {}, function () {
            errors.push(['untimed']);
        });
        posted.length = 0;

        runTimers();
        return { errors: errors, listeners: listenerCount(), posted: posted };
        "#,
    );

    assert_eq!(
        result["errors"],
        json!([["once", 3, "Timeout expired"], ["watch", 3, "Timeout expired"]])
    );
    assert_eq!(result["listeners"], 2);
    assert_eq!(result["posted"], json!(["listenerRemoved"]));
}

#[test]
fn test_delivery_and_clear_cancel_timers() {
    let page = Page::new();

    let result = page.eval(
        r#"
        var errors = 0;
        function fail() { errors += 1; }
        navigator.geolocation.watchPosition(function () {}, fail, { timeout: 10 });
        var cleared = navigator.geolocation.watchPosition(function () {}, fail, { timeout: 10 });
        navigator.geolocation.clearWatch(cleared);
        navigator.geolocation.helper.success('garbage', 1, 2, 0, 0, -1, -1, -1);

        var pending = pendingTimers();
        runTimers();
        return { pending: pending, errors: errors };
        "#,
    );

    assert_eq!(result, json!({ "pending": 0, "errors": 0 }));
}

#[test]
fn test_invalid_timeouts_are_ignored() {
    let page = Page::new();

    let result = page.eval(
        r#"
        navigator.geolocation.watchPosition(null, null, { timeout: -1 });
        navigator.geolocation.watchPosition(null, null, { timeout: 'soon' });
        navigator.geolocation.watchPosition(null, null, {});
        navigator.geolocation.watchPosition(null, null);
        return pendingTimers();
        "#,
    );

    assert_eq!(result, 0);
}

// ============================================================================
// Injection
// ============================================================================

#[test]
fn test_second_injection_keeps_registry() {
    let page = Page::new();
    page.run("navigator.geolocation.watchPosition(function () {});");

    page.inject();

    let result = page.eval(
        r#"
        var id = navigator.geolocation.watchPosition(function () {});
        return { id: id, listeners: listenerCount() };
        "#,
    );
    assert_eq!(result, json!({ "id": 2, "listeners": 2 }));
}
