//! Pipeline benchmark: generate → featurize → score.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use transguard::config::{AppConfig, SimulatorConfig};
use transguard::features::Featureizer;
use transguard::simulator::TxSimulator;
use transguard::Pipeline;

fn bench_generate_batch(c: &mut Criterion) {
    let mut sim = TxSimulator::new(SimulatorConfig::default()).unwrap();

    c.bench_function("generate_batch_100", |b| {
        b.iter(|| black_box(sim.generate_batch(black_box(100))))
    });
}

fn bench_feature_extraction(c: &mut Criterion) {
    let mut sim = TxSimulator::new(SimulatorConfig::default()).unwrap();
    let events = sim.generate_batch(100);
    let mut featurizer = Featureizer::new();

    c.bench_function("featurize_100_events", |b| {
        b.iter(|| {
            for e in &events {
                black_box(featurizer.transform(black_box(e)));
            }
        })
    });
}

fn bench_full_step(c: &mut Criterion) {
    let mut pipeline = Pipeline::new(AppConfig::default()).unwrap();

    c.bench_function("pipeline_step", |b| b.iter(|| black_box(pipeline.step())));
}

criterion_group!(
    benches,
    bench_generate_batch,
    bench_feature_extraction,
    bench_full_step
);
criterion_main!(benches);
