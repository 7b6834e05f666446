//! Window benchmark: append with eviction, and summary over a full window.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use transguard::config::{AppConfig, RiskConfig};
use transguard::{ManualClock, Pipeline, RiskEngine, ScoredRecord, ScoredWindow};

fn scored_records(steps: usize) -> Vec<ScoredRecord> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start, Duration::milliseconds(100));
    let mut pipeline = Pipeline::with_clock(AppConfig::default(), clock).unwrap();
    (0..steps).flat_map(|_| pipeline.step().unwrap()).collect()
}

fn bench_append_evict(c: &mut Criterion) {
    let records = scored_records(100);
    let now = records.last().map(|r| r.meta.timestamp).unwrap();

    c.bench_function("window_append_evict", |b| {
        b.iter(|| {
            let mut window = ScoredWindow::new(30);
            black_box(window.append(black_box(records.clone()), now))
        })
    });
}

fn bench_summary(c: &mut Criterion) {
    let records = scored_records(100);
    let now = records.last().map(|r| r.meta.timestamp).unwrap();
    let mut window = ScoredWindow::new(3600);
    window.append(records, now);
    let risk = RiskEngine::new(RiskConfig::default());

    c.bench_function("window_summary", |b| b.iter(|| black_box(window.summary(&risk))));
    c.bench_function("window_alerts", |b| b.iter(|| black_box(window.alerts(0.5).len())));
}

criterion_group!(benches, bench_append_evict, bench_summary);
criterion_main!(benches);
