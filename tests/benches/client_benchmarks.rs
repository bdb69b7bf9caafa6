//! # Vigil Client Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Phone normalization | < 1µs per number |
//! | Device fingerprint | < 10µs |
//! | Alert publish (4 sync handlers) | < 10µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::sync::Arc;

use shared_bus::{AlertPublisher, AlertRouter, FnHandler, RoutedAlert};
use shared_types::{SecurityAlert, Severity};
use vc_01_identity_resolver::{derive_fingerprint, DeviceAttributes};
use vc_02_contact_normalizer::normalize_phone;

fn random_phone(rng: &mut impl Rng) -> String {
    let digits: String = (0..10).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect();
    format!("+1 ({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

fn bench_normalize_phone(c: &mut Criterion) {
    let mut group = c.benchmark_group("vc-02-contact-normalizer");
    let mut rng = rand::thread_rng();

    for size in [100usize, 1_000, 10_000] {
        let phones: Vec<String> = (0..size).map(|_| random_phone(&mut rng)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("normalize_batch", size), &phones, |b, phones| {
            b.iter(|| {
                phones
                    .iter()
                    .filter_map(|p| normalize_phone(black_box(p)))
                    .count()
            })
        });
    }
    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let attributes = DeviceAttributes {
        install_id: "5b1c6a0e-6f7d-4f43-9b8e-0c1f2d3e4a5b".into(),
        hardware_id: "hw-serial-0042".into(),
        manufacturer: "Acme".into(),
        model: "Phone 3".into(),
        os_family: "android".into(),
    };

    c.bench_function("vc-01-derive-fingerprint", |b| {
        b.iter(|| derive_fingerprint(black_box(&attributes)))
    });
}

fn bench_alert_publish(c: &mut Criterion) {
    let router = AlertRouter::new();
    for i in 0..4 {
        router.subscribe(Arc::new(FnHandler::new(format!("sink-{i}"), |alert: &RoutedAlert| {
            black_box(alert.severity());
            Ok(())
        })));
    }

    c.bench_function("shared-bus-publish-sync", |b| {
        b.iter(|| router.publish(SecurityAlert::new(Severity::Low, "bench", "probe")))
    });
}

criterion_group!(benches, bench_normalize_phone, bench_fingerprint, bench_alert_publish);
criterion_main!(benches);
