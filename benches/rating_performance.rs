//! Performance benchmarks for rating calculations and queue construction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use trackduel::battle::build_battle_queue;
use trackduel::config::PairingConfig;
use trackduel::rating::EloCalculator;
use trackduel::{InMemoryRatingStorage, ItemKind, RankableItem, RatingStore};

fn bench_items(count: usize) -> Vec<RankableItem> {
    (0..count)
        .map(|i| {
            RankableItem::new(
                format!("song-{i}"),
                format!("Track {i}"),
                "Bench Artist",
                ItemKind::Song,
            )
        })
        .collect()
}

fn create_bench_store() -> RatingStore {
    RatingStore::new(Arc::new(InMemoryRatingStorage::new()))
}

fn bench_elo_calculations(c: &mut Criterion) {
    let calculator = EloCalculator::default();

    c.bench_function("expected_score", |b| {
        b.iter(|| calculator.expected_score(black_box(1500.0), black_box(1742.0)))
    });

    c.bench_function("rate_win", |b| {
        b.iter(|| calculator.rate_win(black_box(1500.0), 3, black_box(1742.0), 27))
    });
}

fn bench_store_updates(c: &mut Criterion) {
    let items = bench_items(100);

    c.bench_function("apply_win_100_items", |b| {
        let store = create_bench_store();
        let mut i = 0usize;
        b.iter(|| {
            let winner = &items[i % items.len()];
            let loser = &items[(i + 1) % items.len()];
            store
                .apply_win("bench_context", winner, loser)
                .expect("in-memory storage never fails");
            i += 1;
        })
    });

    c.bench_function("rankings_100_items", |b| {
        let store = create_bench_store();
        for pair in items.chunks(2) {
            if let [winner, loser] = pair {
                store.apply_win("bench_context", winner, loser).unwrap();
            }
        }
        b.iter(|| black_box(store.rankings("bench_context", Some(10))))
    });
}

fn bench_queue_construction(c: &mut Criterion) {
    let config = PairingConfig::default();

    c.bench_function("build_queue_exhaustive_10", |b| {
        let items = bench_items(10);
        let store = create_bench_store();
        b.iter(|| black_box(build_battle_queue(&items, "bench_context", &store, &config)))
    });

    c.bench_function("build_queue_rating_aware_100", |b| {
        let items = bench_items(100);
        let store = create_bench_store();
        b.iter(|| black_box(build_battle_queue(&items, "bench_context", &store, &config)))
    });
}

criterion_group!(
    benches,
    bench_elo_calculations,
    bench_store_updates,
    bench_queue_construction
);
criterion_main!(benches);
