//! Property tests for the population operators.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_sga::sga::{Discretization, Population, SelectionMethod};

fn population(seed: u64, size: usize, length: usize, fitness: &[f64]) -> (Population, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pop = Population::new(
        size,
        length,
        SelectionMethod::RouletteWheel,
        Discretization::Continuous,
        &mut rng,
    );
    for (i, &f) in fitness.iter().enumerate().take(size) {
        pop.set_fitness(i, f);
    }
    (pop, rng)
}

fn genomes(pop: &Population) -> Vec<Vec<f64>> {
    pop.individuals()
        .iter()
        .map(|ind| ind.chromosome().to_vec())
        .collect()
}

fn method() -> impl Strategy<Value = SelectionMethod> {
    prop_oneof![
        Just(SelectionMethod::RouletteWheel),
        Just(SelectionMethod::Tournament)
    ]
}

proptest! {
    #[test]
    fn sort_is_descending(
        seed in any::<u64>(),
        fitness in prop::collection::vec(-1e6f64..1e6, 1..40),
    ) {
        let (mut pop, _) = population(seed, fitness.len(), 3, &fitness);
        pop.sort();
        for pair in pop.individuals().windows(2) {
            prop_assert!(pair[0].fitness() >= pair[1].fitness());
        }
    }

    #[test]
    fn survivors_are_sorted_prefix(
        seed in any::<u64>(),
        fitness in prop::collection::vec(-100.0f64..100.0, 2..40),
        rate in 0.0f64..1.0,
    ) {
        let n = fitness.len();
        let (mut pop, _) = population(seed, n, 2, &fitness);
        pop.select_survivors(rate);

        let expected = (rate * n as f64).floor() as usize;
        prop_assert_eq!(pop.survivor_count(), expected);
        prop_assert_eq!(pop.survivors().len(), expected);

        let mut sorted = fitness.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        for (ind, f) in pop.survivors().iter().zip(&sorted) {
            prop_assert_eq!(ind.fitness(), *f);
        }
    }

    #[test]
    fn crossover_keeps_survivors(
        seed in any::<u64>(),
        size in 4usize..30,
        length in 1usize..6,
        rate in 0.2f64..0.9,
        crossover_rate in 0.0f64..=1.0,
        method in method(),
    ) {
        let fitness: Vec<f64> = (0..size).map(|i| (size - i) as f64).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pop = Population::new(size, length, method, Discretization::Continuous, &mut rng);
        for (i, &f) in fitness.iter().enumerate() {
            pop.set_fitness(i, f);
        }
        let before = genomes(&pop);

        pop.evolve(rate, crossover_rate, &mut rng).unwrap();
        let s = pop.survivor_count();
        let after = genomes(&pop);

        prop_assert_eq!(&after[..s], &before[..s]);
        if s >= 2 && s < size {
            for ind in &pop.individuals()[s..] {
                prop_assert!(!ind.is_evaluated());
                for &g in ind.chromosome() {
                    prop_assert!((0.0..1.0).contains(&g) || (g - 1.0).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn mutation_bounds(
        seed in any::<u64>(),
        size in 3usize..40,
        length in 2usize..8,
        rate in 0.001f64..=1.0,
    ) {
        let fitness: Vec<f64> = (0..size).map(|i| i as f64).collect();
        let (mut pop, mut rng) = population(seed, size, length, &fitness);
        let before = genomes(&pop);

        pop.mutate(rate, &mut rng);
        let after = genomes(&pop);

        let expected = ((rate * (size - 1) as f64).floor() as usize).clamp(1, size - 2);
        let mutants = pop.mutants().to_vec();
        prop_assert_eq!(mutants.len(), expected);
        prop_assert!(!mutants.contains(&0));
        prop_assert!(!mutants.contains(&(size - 1)));

        for i in 0..size {
            let changed = before[i].iter().zip(&after[i]).filter(|(a, b)| a != b).count();
            prop_assert!(changed <= 1);
            if !mutants.contains(&i) {
                prop_assert_eq!(changed, 0);
            }
            prop_assert_eq!(before[i][length - 1], after[i][length - 1]);
        }
    }

    #[test]
    fn restore_reverts_only_flagged(
        seed in any::<u64>(),
        flags in prop::collection::vec(any::<bool>(), 3..20),
    ) {
        let size = flags.len();
        let fitness: Vec<f64> = (0..size).map(|i| (size - i) as f64).collect();
        let (mut pop, mut rng) = population(seed, size, 4, &fitness);
        pop.save_genes();
        let saved = genomes(&pop);

        pop.mutate(1.0, &mut rng);
        let mutated = genomes(&pop);

        for (i, &flag) in flags.iter().enumerate() {
            pop.set_violation(i, flag);
        }
        let restored = pop.restore_genes();
        prop_assert_eq!(restored, flags.iter().filter(|&&f| f).count());

        let after = genomes(&pop);
        for (i, &flag) in flags.iter().enumerate() {
            if flag {
                prop_assert_eq!(&after[i], &saved[i]);
            } else {
                prop_assert_eq!(&after[i], &mutated[i]);
            }
        }
    }

    #[test]
    fn niche_count_bounds(
        seed in any::<u64>(),
        size in 1usize..20,
        sigma in 0.01f64..3.0,
    ) {
        let (pop, _) = population(seed, size, 3, &[]);
        let query = pop.individual(0).clone();
        let count = pop.niche_count(&query, sigma);
        prop_assert!(count >= 1.0 - 1e-12, "self-match contributes 1");
        prop_assert!(count <= size as f64 + 1e-12);
    }
}

#[test]
fn niche_count_with_huge_sigma_approaches_population_size() {
    let (pop, _) = population(42, 12, 3, &[]);
    let query = pop.individual(3).clone();
    let count = pop.niche_count(&query, 1e9);
    assert!((count - 12.0).abs() < 1e-6);
}
