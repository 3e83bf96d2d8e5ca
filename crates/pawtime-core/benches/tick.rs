//! Throughput of the decay tick and of engine-level ticking.
//!
//! Run with: cargo bench --package pawtime-core
//!
//! This will generate HTML reports in target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pawtime_core::prelude::*;
use pawtime_logic::codec::encode;
use pawtime_logic::decay::advance;

const BREEDS: [&str; 6] = ["拉布拉多", "柯基", "哈士奇", "金毛", "边牧", "柴犬"];

/// Create `count` pets spread across the standard breeds.
fn create_pets(count: usize) -> Vec<Pet> {
    (0..count)
        .map(|i| Pet::new(format!("pet-{i}"), BREEDS[i % BREEDS.len()], "活泼", 0.0))
        .collect()
}

fn bench_advance(c: &mut Criterion) {
    let rules = Ruleset::standard();
    let mut group = c.benchmark_group("advance");

    for count in [1, 100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{count}_pets")), &count, |b, &count| {
            let mut pets = create_pets(count);
            b.iter(|| {
                for pet in pets.iter_mut() {
                    black_box(advance(pet, black_box(30.0), &rules));
                }
            });
        });
    }

    group.finish();
}

fn bench_engine_tick_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick_all");

    for count in [10, 100, 1_000] {
        let engine = PetEngine::new(
            Ruleset::standard(),
            Box::new(MemoryPetRepository::new()),
            StdRng::seed_from_u64(0),
        );
        for i in 0..count {
            engine
                .adopt(&format!("pet-{i}"), BREEDS[i % BREEDS.len()], "温顺", 0.0)
                .unwrap();
        }

        let mut now = 0.0;
        group.bench_with_input(BenchmarkId::from_parameter(format!("{count}_pets")), &count, |b, _| {
            b.iter(|| {
                now += 30.0;
                black_box(engine.tick_all(now))
            });
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let pet = create_pets(1).remove(0);
    c.bench_function("encode_record", |b| b.iter(|| black_box(encode(black_box(&pet)))));
}

criterion_group!(benches, bench_advance, bench_engine_tick_all, bench_encode);
criterion_main!(benches);
