use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use stockbook_core::{ProductId, StockKey};
use stockbook_ledger::{Ledger, MovementContext, StockMutator};

fn seeded_mutator(movements: u64) -> (Arc<Ledger>, StockMutator, StockKey) {
    let ledger = Arc::new(Ledger::new());
    let mutator = StockMutator::new(ledger.clone());
    let key = StockKey::product(ProductId::new("BENCH-SKU").unwrap());
    for _ in 0..movements {
        mutator
            .receive(&key, 5, None, Some(100), MovementContext::default())
            .unwrap();
    }
    (ledger, mutator, key)
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    for size in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let (_, mutator, key) = seeded_mutator(0);
                for _ in 0..size {
                    mutator
                        .receive(&key, 1, None, None, MovementContext::default())
                        .unwrap();
                }
                black_box(mutator.ledger().len())
            });
        });
    }
    group.finish();
}

fn bench_current_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("current_balance");
    for size in [100u64, 1_000, 10_000] {
        let (ledger, _mutator, key) = seeded_mutator(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(ledger.current_balance(&key)));
        });
    }
    group.finish();
}

fn bench_history_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    for size in [100u64, 1_000, 10_000] {
        let (ledger, _mutator, key) = seeded_mutator(size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(ledger.history(&key).len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_append, bench_current_balance, bench_history_replay);
criterion_main!(benches);
