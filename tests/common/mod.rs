//! Shared fixtures: a scripted location provider and a wired-up page.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use webview_geolocation::transport::{ProviderSender, ScriptEnvironment, channel};
use webview_geolocation::{
    AuthorizationKind, AuthorizationStatus, Bridge, BridgeBuilder, BridgeHandle, DesiredAccuracy,
    Geolocation, LocationProvider, PositionSample, ProviderEvent,
};

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FakeProvider
// ============================================================================

#[derive(Debug)]
pub struct ProviderState {
    pub enabled: bool,
    pub status: AuthorizationStatus,
    pub sensing: bool,
    pub starts: Vec<DesiredAccuracy>,
    pub stops: usize,
    pub requests: Vec<AuthorizationKind>,
    pub cached: Option<PositionSample>,
}

/// Provider whose state the test controls through a shared handle.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    pub state: Arc<Mutex<ProviderState>>,
}

impl FakeProvider {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                enabled: true,
                status,
                sensing: false,
                starts: Vec::new(),
                stops: 0,
                requests: Vec::new(),
                cached: None,
            })),
        }
    }
}

impl LocationProvider for FakeProvider {
    fn start_updating_location(&mut self, accuracy: DesiredAccuracy) {
        let mut state = self.state.lock();
        state.sensing = true;
        state.starts.push(accuracy);
    }

    fn stop_updating_location(&mut self) {
        let mut state = self.state.lock();
        state.sensing = false;
        state.stops += 1;
    }

    fn location_services_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.state.lock().status
    }

    fn request_authorization(&mut self, kind: AuthorizationKind) {
        self.state.lock().requests.push(kind);
    }

    fn last_known_location(&self) -> Option<PositionSample> {
        self.state.lock().cached.clone()
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A running bridge wired to an in-process page.
pub struct Harness {
    pub geolocation: Geolocation,
    pub page: ScriptEnvironment,
    pub handle: BridgeHandle,
    pub provider: FakeProvider,
    pub events: ProviderSender,
}

impl Harness {
    pub fn start(status: AuthorizationStatus) -> Self {
        Self::with_builder(Bridge::builder(), FakeProvider::new(status))
    }

    pub fn with_builder(builder: BridgeBuilder, provider: FakeProvider) -> Self {
        init_tracing();

        let (messages_tx, messages_rx) = channel();
        let (events_tx, events_rx) = channel();
        let (page, view) = ScriptEnvironment::new(messages_tx);
        let geolocation = page.geolocation();

        let bridge = match builder.build(provider.clone(), view) {
            Ok(bridge) => bridge,
            Err(e) => panic!("bridge build failed: {e}"),
        };
        let handle = bridge.spawn(messages_rx, events_rx);

        Self {
            geolocation,
            page,
            handle,
            provider,
            events: events_tx,
        }
    }

    /// Lets the bridge and the page exchange everything in flight.
    pub async fn settle(&mut self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
            self.page.run_pending();
        }
    }

    /// Sends a provider event and settles.
    pub async fn emit(&mut self, event: ProviderEvent) {
        self.events.post(event);
        self.settle().await;
    }

    pub fn sensing(&self) -> bool {
        self.provider.state.lock().sensing
    }
}

pub fn sample(latitude: f64, longitude: f64) -> PositionSample {
    PositionSample::new("2024-05-01 12:00:00 +0000", latitude, longitude).with_accuracy(5.0)
}
