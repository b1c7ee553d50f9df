use criterion::{criterion_group, criterion_main, Criterion};
use seird::{presets, sweep, DormandPrince, RungeKutta4, Simulator};
use std::hint::black_box;

pub fn criterion_benchmark(c: &mut Criterion) {
    let seird = presets::covid19_seird();
    let seirdp = presets::covid19_seirdp();

    let rk4 = Simulator::new(RungeKutta4::default());
    c.bench_function("covid19-seird rk4", |bencher| {
        bencher.iter_with_large_drop(|| rk4.solve_scenario(black_box(&seird)));
    });

    let dopri5 = Simulator::new(DormandPrince::default());
    c.bench_function("covid19-seird dopri5", |bencher| {
        bencher.iter_with_large_drop(|| dopri5.solve_scenario(black_box(&seird)));
    });

    c.bench_function("covid19-seirdp rk4", |bencher| {
        bencher.iter_with_large_drop(|| rk4.solve_scenario(black_box(&seirdp)));
    });

    let scenarios = vec![seird.clone(); 8];
    c.bench_function("sweep 8 scenarios", |bencher| {
        bencher.iter_with_large_drop(|| sweep(black_box(&scenarios), &rk4));
    });
}

criterion_group!(solve_benches, criterion_benchmark);
criterion_main!(solve_benches);
