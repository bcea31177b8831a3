//! Criterion benchmarks for the SGA core.
//!
//! Uses a synthetic layout score (distance to a fixed target genome) so the
//! numbers measure pure algorithm overhead independent of any yield model.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_sga::sga::{
    Discretization, LayoutProblem, Population, SelectionMethod, SgaConfig, SgaRunner,
};

// ===========================================================================
// Target layout: maximize closeness to a fixed genome
// ===========================================================================

struct TargetLayout {
    target: Vec<f64>,
}

impl TargetLayout {
    fn new(dim: usize) -> Self {
        Self {
            target: (0..dim).map(|i| (i as f64 + 0.5) / dim as f64).collect(),
        }
    }
}

impl LayoutProblem for TargetLayout {
    fn evaluate(&self, genes: &[f64]) -> f64 {
        -genes
            .iter()
            .zip(&self.target)
            .map(|(g, t)| (g - t) * (g - t))
            .sum::<f64>()
    }

    fn is_valid(&self, genes: &[f64]) -> bool {
        // Adjacent rows may not swap order.
        genes.windows(2).all(|w| w[0] <= w[1] + 0.5)
    }
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_runner(c: &mut Criterion) {
    let mut group = c.benchmark_group("sga_runner");
    group.sample_size(10);

    for (dim, pop, gen) in [(8usize, 50usize, 50usize), (32, 100, 30), (64, 100, 20)] {
        let problem = TargetLayout::new(dim);
        let config = SgaConfig::new(dim)
            .with_population_size(pop)
            .with_max_generations(gen)
            .with_convergence_threshold(0.0)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("d{}_p{}_g{}", dim, pop, gen), dim),
            &(problem, config),
            |b, (p, c)| {
                b.iter(|| {
                    let result = SgaRunner::run(black_box(p), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("sga_evolve");
    group.sample_size(20);

    for method in [SelectionMethod::RouletteWheel, SelectionMethod::Tournament] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{method:?}")),
            &method,
            |b, &method| {
                let mut rng = StdRng::seed_from_u64(42);
                let mut pop =
                    Population::new(200, 32, method, Discretization::Continuous, &mut rng);
                b.iter(|| {
                    for (i, ind) in pop.individuals_mut().iter_mut().enumerate() {
                        ind.set_fitness((i % 17) as f64);
                    }
                    pop.evolve(0.3, 0.8, &mut rng).unwrap();
                    pop.mutate(0.1, &mut rng);
                })
            },
        );
    }
    group.finish();
}

fn bench_niche_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("sga_niche_count");
    group.sample_size(20);

    for &n in &[50usize, 200] {
        let mut rng = StdRng::seed_from_u64(42);
        let pop = Population::new(
            n,
            16,
            SelectionMethod::RouletteWheel,
            Discretization::Continuous,
            &mut rng,
        );
        group.bench_with_input(BenchmarkId::from_parameter(n), &pop, |b, pop| {
            b.iter(|| {
                let total: f64 = pop
                    .individuals()
                    .iter()
                    .map(|ind| pop.niche_count(ind, 0.3))
                    .sum();
                black_box(total)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_runner, bench_evolve, bench_niche_count);
criterion_main!(benches);
