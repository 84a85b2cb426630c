use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use section_sync::{
    ChangeSet,
    ControllerConfig,
    ObjectEvent,
    OrderedSet,
    SectionedResultsController,
    SortDescriptors,
    ViolationPolicy,
};
use std::hint::black_box;

// target = source with every 10th element dropped, a block of new ids
// appended and pairs swapped
fn make_pair(size: u32) -> (OrderedSet<u32>, OrderedSet<u32>) {
    let source: OrderedSet<u32> = (0..size).collect();
    let mut target: Vec<u32> = (0..size).filter(|n| n % 10 != 0).chain(size..size + size / 10).collect();
    for pair in target.chunks_mut(2) {
        pair.reverse();
    }
    (source, target.into_iter().collect())
}

// DIFF

fn bench_change_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("change_set");
    for size in [100, 1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let (source, target) = make_pair(size);
            b.iter(|| {
                let cs = ChangeSet::compute(black_box(&source), black_box(&target));
                black_box(cs);
            });
        });
    }
    group.finish();
}

// CONTROLLER

fn bench_controller_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_batch");
    for sections in [1u32, 16, 128].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(sections), sections, |b, &sections| {
            let objects: Vec<u32> = (0..50_000).collect();
            let events: Vec<ObjectEvent<u32>> = (0..50_000)
                .step_by(5)
                .map(ObjectEvent::Removed)
                .chain((50_000..55_000).map(ObjectEvent::Inserted))
                .collect();
            b.iter(|| {
                let mut controller = SectionedResultsController::builder(move |n: &u32| n % sections)
                    .with_sort(SortDescriptors::new().with_key(|n: &u32| *n, true))
                    .with_config(ControllerConfig::new().with_violation_policy(ViolationPolicy::Reject))
                    .build();
                let _ = controller.perform_fetch(objects.clone());
                let stats = controller.process(black_box(events.clone()));
                let _ = black_box(stats);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_change_set, bench_controller_batch);
criterion_main!(benches);
