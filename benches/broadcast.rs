//! Delivery benchmark suite.
//!
//! Benchmarks position delivery at different scales:
//! - Fan-out: one fix to 1, 10, 100, 1000 listeners
//! - Round trip: provider event → bridge → page → callback
//!
//! Run with: cargo bench --bench broadcast
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use tokio::sync::Notify;
use webview_geolocation::transport::{ScriptEnvironment, channel};
use webview_geolocation::{
    AuthorizationKind, AuthorizationStatus, Bridge, DesiredAccuracy, Geolocation,
    LocationProvider, PositionOptions, PositionSample, ProviderEvent, SensingState,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const LISTENER_COUNTS: &[usize] = &[1, 10, 100, 1000];

// ============================================================================
// Fixtures
// ============================================================================

/// Provider that is always authorized and never fails.
struct AlwaysOnProvider;

impl LocationProvider for AlwaysOnProvider {
    fn start_updating_location(&mut self, _accuracy: DesiredAccuracy) {}

    fn stop_updating_location(&mut self) {}

    fn location_services_enabled(&self) -> bool {
        true
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::AuthorizedAlways
    }

    fn request_authorization(&mut self, _kind: AuthorizationKind) {}
}

fn fix() -> PositionSample {
    PositionSample::new("2024-05-01T12:00:00Z", 47.3769, 8.5417)
        .with_accuracy(4.0)
        .with_motion(90.0, 1.5)
}

// ============================================================================
// Benchmark: Fan-out
// ============================================================================

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for &count in LISTENER_COUNTS {
        let (outbox, _inbox) = channel();
        let geolocation = Geolocation::new(outbox);
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..count {
            let hits = Arc::clone(&hits);
            geolocation.watch_position(
                move |_| {
                    hits.fetch_add(1, Ordering::Relaxed);
                },
                |_| {},
                PositionOptions::default(),
            );
        }

        let sample = fix();
        group.bench_with_input(BenchmarkId::new("success", count), &count, |b, _| {
            b.iter(|| geolocation.success(black_box(&sample)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Round Trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let _guard = rt.enter();

    let (messages_tx, messages_rx) = channel();
    let (events_tx, events_rx) = channel();
    let (page, view) = ScriptEnvironment::new(messages_tx);
    let geolocation = page.geolocation();
    let _page_task = page.spawn();

    let bridge = Bridge::builder()
        .build(AlwaysOnProvider, view)
        .expect("bridge");
    let handle = bridge.spawn(messages_rx, events_rx);

    let delivered = Arc::new(Notify::new());
    let signal = Arc::clone(&delivered);
    geolocation.watch_position(
        move |_| signal.notify_one(),
        |_| {},
        PositionOptions::default(),
    );

    rt.block_on(async {
        while handle.state() != SensingState::Sensing {
            tokio::task::yield_now().await;
        }
    });

    let mut group = c.benchmark_group("round_trip");
    group.bench_function("provider_to_callback", |b| {
        b.to_async(&rt).iter(|| {
            let events = events_tx.clone();
            let delivered = Arc::clone(&delivered);
            async move {
                events.post(ProviderEvent::Location(fix()));
                delivered.notified().await;
            }
        });
    });
    group.finish();

    drop(handle);
}

criterion_group!(benches, bench_fan_out, bench_round_trip);
criterion_main!(benches);
