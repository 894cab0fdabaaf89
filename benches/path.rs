use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linfa_admm::benchmarks::config;
use linfa_admm::traits::Fit;
use linfa_admm::{AdmmParams, ParamGuard, PathStrategy, RhoAdaptation};
use linfa_admm_datasets::generate::make_regression;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn path_bench(c: &mut Criterion) {
    let mut rng = Xoshiro256Plus::seed_from_u64(40);
    let mut benchmark = c.benchmark_group("elastic-net path");
    config::set_default_benchmark_configs(&mut benchmark);

    for (n_samples, n_features) in config::PATH_SHAPES {
        let problem = make_regression(n_samples, n_features, 10, 0.5, &mut rng);

        for (strategy, rho_adaptation, name) in [
            (PathStrategy::Continuation, RhoAdaptation::Fixed, "continuation"),
            (PathStrategy::Independent, RhoAdaptation::Fixed, "independent"),
            (
                PathStrategy::Continuation,
                RhoAdaptation::Balanced { mu: 10., tau: 2. },
                "continuation balanced",
            ),
        ] {
            let params = AdmmParams::new()
                .l1_ratio(0.5)
                .n_lambda(50)
                .strategy(strategy)
                .rho_adaptation(rho_adaptation)
                .check_unwrap();

            benchmark.bench_with_input(
                BenchmarkId::new(name, format!("{}x{}", n_samples, n_features)),
                &problem,
                |bencher, problem| {
                    bencher.iter(|| {
                        params
                            .fit(black_box(&problem.records), black_box(&problem.targets))
                            .unwrap()
                    });
                },
            );
        }
    }

    benchmark.finish();
}

#[cfg(not(target_os = "windows"))]
criterion_group! {
    name = benches;
    config = config::get_default_profiling_configs();
    targets = path_bench
}
#[cfg(target_os = "windows")]
criterion_group!(benches, path_bench);

criterion_main!(benches);
