//! Criterion benchmarks for the environment hot path.
//! Focus sizes: link count n in {1, 2, 4, 8, 16}.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p armsim

use armsim::chain::Arm;
use armsim::geom::{Point2, Size2};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn arm_with_links(n: usize, seed: u64) -> Arm {
    let mut arm = Arm::new(Point2::new(0.0, 100.0), Size2::new(200.0, 200.0)).with_seed(seed);
    for _ in 0..n {
        arm.add_link(100.0 / n as f64, [255, 0, 0]);
    }
    arm.reset();
    arm
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("arm");
    for &n in &[1usize, 2, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("step", n), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(7);
            let actions: Vec<Vec<f64>> = (0..64)
                .map(|_| (0..n).map(|_| rng.gen_range(-1.0..=1.0)).collect())
                .collect();
            b.iter_batched(
                || arm_with_links(n, 43),
                |mut arm| {
                    for a in &actions {
                        let _s = arm.step(a);
                    }
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("reset", n), &n, |b, &n| {
            let mut arm = arm_with_links(n, 44);
            b.iter(|| {
                let _s = arm.reset();
            })
        });

        group.bench_with_input(BenchmarkId::new("set_angles", n), &n, |b, &n| {
            let mut arm = arm_with_links(n, 45);
            let degrees = vec![45.0; n];
            b.iter(|| arm.set_angles(&degrees).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
