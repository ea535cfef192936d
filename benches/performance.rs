//! Performance benchmarks for result rendering and sample reduction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use librespeed_rs::{
    measurement::ping_and_jitter_from_samples,
    models::{IspInfo, Measurements, Report},
    output::{humanize_mbps, render_csv, render_json},
};
use url::Url;

/// Create sample reports for benchmarking the machine-readable renderers
fn create_sample_reports(count: usize) -> Vec<Report> {
    let url = Url::parse("https://speed.example.net/").unwrap();
    let isp = IspInfo::from_plain("198.51.100.20");

    (0..count)
        .map(|i| {
            let measurements = Measurements {
                ping: 10.0 + (i % 40) as f64 * 0.37,
                jitter: 0.5 + (i % 7) as f64 * 0.11,
                download: 100.0 + i as f64 * 1.713,
                upload: 40.0 + i as f64 * 0.917,
                bytes_received: 25_000_000 + i as u64 * 1_024,
                bytes_sent: 10_000_000 + i as u64 * 512,
            };
            Report::new(&format!("Server {}", i), &url, &isp, &measurements, String::new())
        })
        .collect()
}

fn benchmark_humanize(c: &mut Criterion) {
    let mut group = c.benchmark_group("humanize");
    let rates = [0.004, 0.9, 87.3, 940.12, 25_000.0];

    for binary_base in [false, true] {
        group.bench_with_input(
            BenchmarkId::new("humanize_mbps", if binary_base { "1024" } else { "1000" }),
            &binary_base,
            |b, &binary_base| {
                b.iter(|| {
                    for rate in rates {
                        black_box(humanize_mbps(black_box(rate), binary_base));
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    for count in [1, 10, 100] {
        let reports = create_sample_reports(count);

        group.bench_with_input(BenchmarkId::new("csv", count), &reports, |b, reports| {
            b.iter(|| black_box(render_csv(reports, b',').unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("json", count), &reports, |b, reports| {
            b.iter(|| black_box(render_json(reports).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_latency_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("latency");

    for count in [10, 100, 1000] {
        let samples: Vec<f64> = (0..count).map(|i| 12.0 + (i % 9) as f64 * 0.8).collect();
        group.bench_with_input(BenchmarkId::new("ping_and_jitter", count), &samples, |b, samples| {
            b.iter(|| black_box(ping_and_jitter_from_samples(samples)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_humanize,
    benchmark_rendering,
    benchmark_latency_reduction
);
criterion_main!(benches);
