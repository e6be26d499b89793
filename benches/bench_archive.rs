use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epsbox::{
    archive::{ArchiveOptions, EpsilonBoxArchive},
    rng::RandomNumberGenerator,
    solution::Solution,
};

/// Points scattered around the front x + y = 1.
fn points(count: usize, seed: u64) -> Vec<Solution> {
    let mut rng = RandomNumberGenerator::from_seed(seed);
    (0..count)
        .map(|_| {
            let x = rng.next_f64();
            let y = 1.0 - x + 0.1 * rng.next_f64();
            Solution::with_objectives(&[x, y])
        })
        .collect()
}

fn bench_archive_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_add");
    let solutions = points(20_000, 1);

    for epsilon in [0.01, 0.001, 0.0001].iter() {
        group.bench_with_input(
            BenchmarkId::new("sequential", epsilon),
            epsilon,
            |b, &epsilon| {
                let options = ArchiveOptions::builder()
                    .epsilons(vec![epsilon, epsilon])
                    .parallel_threshold(usize::MAX)
                    .build()
                    .unwrap();
                b.iter(|| {
                    let mut archive = EpsilonBoxArchive::new(options.clone());
                    for solution in &solutions {
                        archive.add(black_box(solution.clone())).unwrap();
                    }
                    archive.len()
                })
            },
        );
    }
    group.finish();
}

fn bench_parallel_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_parallel_scan");
    let solutions = points(5_000, 2);
    let probes = points(100, 3);

    for threshold in [usize::MAX, 1000, 100].iter() {
        let options = ArchiveOptions::builder()
            .epsilons(vec![0.0001, 0.0001])
            .parallel_threshold(*threshold)
            .build()
            .unwrap();
        let mut archive = EpsilonBoxArchive::new(options);
        archive.add_all(solutions.iter().cloned()).unwrap();

        group.bench_function(&format!("threshold_{}", threshold), |b| {
            b.iter(|| {
                let mut copy = archive.clone();
                for probe in &probes {
                    copy.add(black_box(probe.clone())).unwrap();
                }
                copy.len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_archive_add, bench_parallel_scan);
criterion_main!(benches);
