//! Criterion micro-benchmarks for allocation and bulk reclamation.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::hint::black_box;
use tessera_arena::{AllocatorPolicy, Arena, Init};
use tessera_bench::{matrix_pair, step_profile, vector_pair};

const STEPS: usize = 32;

fn policies() -> [(&'static str, AllocatorPolicy); 2] {
    [
        ("heap", AllocatorPolicy::Heap),
        ("recycling", AllocatorPolicy::Recycling),
    ]
}

fn bench_temp_alloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("temp_alloc");
    for (name, policy) in policies() {
        let arena = Arena::new(policy);
        group.bench_function(BenchmarkId::new(name, 1024), |bench| {
            bench.iter(|| {
                for _ in 0..STEPS {
                    black_box(arena.temp_vec(1024, Init::<f32>::Uninit));
                }
                arena.clear_temp();
            });
        });
    }
    group.finish();
}

fn bench_step_then_clear(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_then_clear_temp");
    for (name, policy) in policies() {
        let arena = Arena::new(policy);
        let (a, _) = matrix_pair(&arena, 64, 7);
        let (x, _) = vector_pair(&arena, 64, 8);
        group.bench_function(name, |bench| {
            bench.iter(|| {
                let mut state = step_profile(&a, &x, 0.05);
                for _ in 1..STEPS {
                    state = step_profile(&a, &state, 0.05);
                }
                black_box(state.get(0));
                arena.clear_temp();
            });
        });
    }
    group.finish();
}

fn bench_clear_temp(c: &mut Criterion) {
    let mut group = c.benchmark_group("clear_temp");
    for live in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(live), &live, |bench, &live| {
            bench.iter_batched(
                || {
                    let arena = Arena::new(AllocatorPolicy::Heap);
                    for _ in 0..live {
                        let _ = arena.temp_vec(8, Init::<f64>::Zeroed);
                    }
                    arena
                },
                |arena| {
                    arena.clear_temp();
                    arena
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_temp_alloc, bench_step_then_clear, bench_clear_temp);
criterion_main!(benches);
