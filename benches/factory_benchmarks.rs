//! Micro benchmarks for the socket factory
//!
//! Measures the cost the factory adds on top of plain socket creation:
//! - Resolving a raw option bag
//! - Creating and configuring an unconnected socket
//! - Connecting over loopback with and without keepalive tuning
//!
//! Run with: cargo bench --bench factory_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pg_socket_factory::config::{RawConfig, ResolvedConfig};
use pg_socket_factory::factory::{KeepaliveSocketFactory, MakeSocket, SocketRegistry};
use std::net::TcpListener;
use std::sync::Arc;

fn tuned_options() -> RawConfig {
    RawConfig::new()
        .set("keepAlive", "true")
        .set("keepAliveIdle", "60")
        .set("keepAliveInterval", "30")
        .set("keepAliveCount", "5")
        .set("user", "bench")
        .set("sslmode", "disable")
}

// ============================================================================
// Configuration Resolution
// ============================================================================

fn resolve_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    let valid = tuned_options();
    let invalid = RawConfig::new()
        .set("keepAlive", "yes")
        .set("keepAliveIdle", "soon")
        .set("keepAliveCount", "10000000");

    group.bench_function("valid_options", |b| {
        b.iter(|| black_box(ResolvedConfig::from_raw(black_box(&valid))));
    });
    group.bench_function("rejected_options", |b| {
        b.iter(|| black_box(ResolvedConfig::from_raw(black_box(&invalid))));
    });
    group.bench_function("parse_query", |b| {
        b.iter(|| {
            black_box(RawConfig::parse_query(black_box(
                "?keepAlive=true&keepAliveIdle=60&keepAliveInterval=30&keepAliveCount=5",
            )))
        });
    });

    group.finish();
}

// ============================================================================
// Socket Creation
// ============================================================================

fn socket_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("socket");
    group.sample_size(50);

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");

    let configs = vec![
        ("defaults", RawConfig::new()),
        ("tuned", tuned_options()),
    ];

    for (name, raw) in configs {
        // Private registry so the benchmark does not grow the global one
        let factory = KeepaliveSocketFactory::from_raw(&raw)
            .with_registry(Arc::new(SocketRegistry::new()));

        group.bench_with_input(BenchmarkId::new("create", name), &factory, |b, f| {
            b.iter(|| black_box(f.create_socket().expect("create socket")));
        });

        group.bench_with_input(BenchmarkId::new("connect_loopback", name), &factory, |b, f| {
            b.iter(|| {
                let socket = f.connect_addr(addr).expect("connect");
                // Drain the accept queue so it never fills up
                let _ = listener.accept();
                black_box(socket)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, resolve_benchmarks, socket_benchmarks);
criterion_main!(benches);
