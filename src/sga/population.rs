//! The SGA population and its generation operators.
//!
//! A [`Population`] owns the current generation, a snapshot of the last
//! generation accepted as valid, and one violation flag per slot. The
//! caller drives each generation:
//!
//! 1. Evaluate every individual and flag the ones whose layout is invalid.
//! 2. [`save_genes`](Population::save_genes) when nothing is flagged, or
//!    [`restore_genes`](Population::restore_genes) to roll flagged slots back.
//! 3. [`evolve`](Population::evolve) (elitist selection + blend crossover),
//!    then [`mutate`](Population::mutate).
//!
//! [`fittest`](Population::fittest) and
//! [`is_nominally_converged`](Population::is_nominally_converged) report on
//! the current state between generations.

use super::config::SgaConfig;
use super::error::SgaError;
use super::individual::{Discretization, Individual};
use super::parents::Parents;
use super::selection::{PairFiltering, SelectionMethod, MAX_REDRAWS};
use rand::Rng;

/// Fixed-size population with rollback support.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_sga::sga::{Discretization, Population, SelectionMethod};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut pop = Population::new(
///     10,
///     4,
///     SelectionMethod::RouletteWheel,
///     Discretization::Continuous,
///     &mut rng,
/// );
/// for (i, ind) in pop.individuals_mut().iter_mut().enumerate() {
///     ind.set_fitness(i as f64);
/// }
/// pop.save_genes();
/// pop.evolve(0.3, 0.9, &mut rng).unwrap();
/// pop.mutate(0.2, &mut rng);
///
/// assert_eq!(pop.survivor_count(), 3);
/// assert_eq!(pop.individual(0).fitness(), 9.0);
/// ```
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
    saved_generation: Vec<Individual>,
    violations: Vec<bool>,
    survivor_count: usize,
    mutants: Vec<usize>,
    beta: f64,
    chromosome_length: usize,
    selection_method: SelectionMethod,
    pair_filtering: PairFiltering,
}

impl Population {
    /// Creates a population of `size` random individuals.
    ///
    /// The saved generation starts as a copy of the initial genomes and no
    /// violations are flagged.
    pub fn new<R: Rng>(
        size: usize,
        chromosome_length: usize,
        selection_method: SelectionMethod,
        discretization: Discretization,
        rng: &mut R,
    ) -> Self {
        let individuals: Vec<Individual> = (0..size)
            .map(|_| Individual::random(chromosome_length, discretization, rng))
            .collect();
        let saved_generation = individuals.clone();

        Self {
            individuals,
            saved_generation,
            violations: vec![false; size],
            survivor_count: 0,
            mutants: Vec::new(),
            beta: f64::NAN,
            chromosome_length,
            selection_method,
            pair_filtering: PairFiltering::default(),
        }
    }

    /// Creates a population from a validated configuration.
    pub fn from_config<R: Rng>(config: &SgaConfig, rng: &mut R) -> Result<Self, SgaError> {
        config.validate()?;
        Ok(Self::new(
            config.population_size,
            config.chromosome_length,
            config.selection_method,
            config.discretization,
            rng,
        )
        .with_pair_filtering(config.pair_filtering))
    }

    pub fn with_pair_filtering(mut self, filtering: PairFiltering) -> Self {
        self.pair_filtering = filtering;
        self
    }

    // ---- Accessors ----

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn chromosome_length(&self) -> usize {
        self.chromosome_length
    }

    pub fn selection_method(&self) -> SelectionMethod {
        self.selection_method
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Mutable access for recording fitness values.
    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn individual(&self, i: usize) -> &Individual {
        &self.individuals[i]
    }

    pub fn set_fitness(&mut self, i: usize, fitness: f64) {
        self.individuals[i].set_fitness(fitness);
    }

    /// Overwrites the genome in slot `i`, e.g. to inject a known layout.
    ///
    /// The slot's fitness is invalidated.
    pub fn seed_genes(&mut self, i: usize, genes: &[f64]) -> Result<(), SgaError> {
        if genes.len() != self.chromosome_length {
            return Err(SgaError::GenomeLengthMismatch {
                expected: self.chromosome_length,
                actual: genes.len(),
            });
        }
        let ind = &mut self.individuals[i];
        for (g, &value) in genes.iter().enumerate() {
            ind.set_gene(g, value);
        }
        ind.invalidate_fitness();
        Ok(())
    }

    /// Replaces the genome in slot `i` with a fresh random one.
    ///
    /// The slot's fitness is invalidated.
    pub fn randomize<R: Rng>(&mut self, i: usize, rng: &mut R) {
        let ind = &mut self.individuals[i];
        *ind = Individual::random(self.chromosome_length, ind.discretization(), rng);
    }

    /// Copies the individual (genes and fitness) and violation flag of slot
    /// `from` into slot `to`.
    pub fn replicate(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let source = self.individuals[from].clone();
        self.individuals[to] = source;
        self.violations[to] = self.violations[from];
    }

    /// The survivors chosen by the latest [`select_survivors`](Self::select_survivors).
    ///
    /// Survivors are always a prefix of the population.
    pub fn survivors(&self) -> &[Individual] {
        &self.individuals[..self.survivor_count.min(self.individuals.len())]
    }

    pub fn survivor_count(&self) -> usize {
        self.survivor_count
    }

    /// Indices mutated by the latest [`mutate`](Self::mutate) call.
    pub fn mutants(&self) -> &[usize] {
        &self.mutants
    }

    /// Blend coefficient drawn by the latest crossover; NaN before the first.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn saved_generation(&self) -> &[Individual] {
        &self.saved_generation
    }

    // ---- Violations and rollback ----

    pub fn set_violation(&mut self, i: usize, violated: bool) {
        self.violations[i] = violated;
    }

    pub fn violations(&self) -> &[bool] {
        &self.violations
    }

    pub fn violation_count(&self) -> usize {
        self.violations.iter().filter(|&&v| v).count()
    }

    /// Accepts the current generation as valid.
    ///
    /// Every genome (and its fitness) is copied into the saved generation
    /// and all violation flags are cleared.
    pub fn save_genes(&mut self) {
        for (saved, ind) in self.saved_generation.iter_mut().zip(&self.individuals) {
            saved.clone_from(ind);
        }
        self.violations.fill(false);
    }

    /// Rolls every flagged slot back to its saved genome.
    ///
    /// Unflagged slots are untouched; flags are left as they are. Returns
    /// the number of restored slots.
    pub fn restore_genes(&mut self) -> usize {
        let mut restored = 0;
        for ((ind, saved), &violated) in self
            .individuals
            .iter_mut()
            .zip(&self.saved_generation)
            .zip(&self.violations)
        {
            if violated {
                ind.copy_genes(saved);
                ind.set_fitness(saved.fitness());
                restored += 1;
            }
        }
        restored
    }

    // ---- Selection ----

    /// Sorts by descending fitness; unevaluated individuals go last.
    pub fn sort(&mut self) {
        self.individuals.sort_by(|a, b| b.compare(a));
    }

    /// Elitist truncation: sorts, then keeps the first
    /// `floor(selection_rate * len)` individuals as survivors.
    pub fn select_survivors(&mut self, selection_rate: f64) {
        self.sort();
        let n = self.individuals.len();
        self.survivor_count = ((selection_rate * n as f64).floor() as usize).min(n);
    }

    /// Selection followed by crossover.
    pub fn evolve<R: Rng>(
        &mut self,
        selection_rate: f64,
        crossover_rate: f64,
        rng: &mut R,
    ) -> Result<(), SgaError> {
        self.select_survivors(selection_rate);
        self.crossover(crossover_rate, rng)
    }

    // ---- Crossover ----

    /// Refills the slots after the survivors with blended offspring.
    ///
    /// One blend coefficient `beta` is drawn per call. Each pair of
    /// survivors yields two children; for every gene a uniform draw below
    /// `crossover_rate` gives `child1 = beta*dad + (1-beta)*mom`, otherwise
    /// the roles of dad and mom are swapped (`child2` is always the mirror).
    /// Children are written to slots `S, S+1, …` and a child with no slot
    /// left is discarded.
    ///
    /// Does nothing when there are fewer than two survivors or no slots to
    /// refill.
    pub fn crossover<R: Rng>(&mut self, crossover_rate: f64, rng: &mut R) -> Result<(), SgaError> {
        let n = self.individuals.len();
        let s = self.survivor_count;
        if s <= 1 || s >= n {
            return Ok(());
        }

        let lowest_fitness = self.individuals[s].fitness();
        let new_born = n - s;
        self.beta = rng.random_range(0.0..1.0);
        let beta = self.beta;

        let (survivors, offspring) = self.individuals.split_at_mut(s);
        let survivors: &[Individual] = survivors;

        // Survivors tied with `lowest_fitness` may be undrawable, so a pair
        // rejected MAX_REDRAWS times in a row is admitted anyway.
        let mut pairs: Vec<Parents<'_>> = Vec::with_capacity(new_born.div_ceil(2));
        let mut rejected = 0;
        while pairs.len() * 2 < new_born {
            let candidate = self
                .selection_method
                .select_pair(survivors, lowest_fitness, rng)?;
            let forced = rejected >= MAX_REDRAWS;
            if forced || self.pair_filtering.admits(&pairs, &candidate, s) {
                if forced {
                    log::debug!("admitting a repeated pair after {rejected} rejections");
                }
                pairs.push(candidate);
                rejected = 0;
            } else {
                rejected += 1;
            }
        }

        for (k, pair) in pairs.iter().enumerate() {
            let (first, second) = mate(pair, beta, crossover_rate, rng);
            for (offset, genes) in [first, second].into_iter().enumerate() {
                if let Some(slot) = offspring.get_mut(2 * k + offset) {
                    for (i, value) in genes.into_iter().enumerate() {
                        slot.set_gene(i, value);
                    }
                    slot.invalidate_fitness();
                }
            }
        }

        log::trace!(
            "crossover: {} pairs from {s} survivors, beta = {beta:.4}",
            pairs.len()
        );
        Ok(())
    }

    // ---- Mutation ----

    /// Replaces one gene of each of several distinct individuals with a
    /// fresh uniform value.
    ///
    /// The mutant count is `floor(mutation_rate * (len - 1))`, raised to 1
    /// and capped at `len - 2`. Mutants are drawn from `[1, len - 2]`, so
    /// the best individual is never touched, and the mutated gene from
    /// `[0, chromosome_length - 2]`. A zero rate is a no-op.
    pub fn mutate<R: Rng>(&mut self, mutation_rate: f64, rng: &mut R) {
        self.mutants.clear();
        let n = self.individuals.len();
        if mutation_rate == 0.0 || n < 3 || self.chromosome_length == 0 {
            return;
        }

        let mut count = (mutation_rate * (n - 1) as f64).floor() as usize;
        if count == 0 {
            count = 1;
        }
        if count >= n - 1 {
            count = n - 2;
        }

        while self.mutants.len() < count {
            let idx = rng.random_range(1..=n - 2);
            if !self.mutants.contains(&idx) {
                self.mutants.push(idx);
            }
        }

        let gene_upper = if self.chromosome_length >= 2 {
            self.chromosome_length - 1
        } else {
            1
        };
        for &idx in &self.mutants {
            let gene = rng.random_range(0..gene_upper);
            let ind = &mut self.individuals[idx];
            ind.set_gene(gene, rng.random_range(0.0..1.0));
            ind.invalidate_fitness();
        }
    }

    // ---- Niching and convergence ----

    /// Sharing sum of `individual` against the whole population.
    ///
    /// Each member within genotype distance `r < sigma` contributes
    /// `1 - r / sigma`; the individual itself (if present) contributes 1.
    /// A non-positive `sigma` yields 0.
    pub fn niche_count(&self, individual: &Individual, sigma: f64) -> f64 {
        self.individuals
            .iter()
            .map(|other| {
                let r = individual.distance(other);
                if r < sigma {
                    1.0 - r / sigma
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Per-gene relative-spread test over the best half of the survivors.
    ///
    /// Uses the top `max(2, S / 2)` survivors. Returns false as soon as
    /// some member's gene deviates from the group mean by more than
    /// `threshold` in relative terms (`|gene / mean - 1|`). Fewer than two
    /// survivors count as converged.
    pub fn is_nominally_converged(&self, threshold: f64) -> bool {
        let s = self.survivor_count.min(self.individuals.len());
        if s < 2 {
            return true;
        }

        let group = &self.individuals[..(s / 2).max(2)];
        let k = group.len() as f64;
        (0..self.chromosome_length).all(|g| {
            let mean = group.iter().map(|ind| ind.gene(g)).sum::<f64>() / k;
            !group
                .iter()
                .any(|ind| (ind.gene(g) / mean - 1.0).abs() > threshold)
        })
    }

    /// The evaluated individual with the greatest fitness.
    ///
    /// Unevaluated individuals are skipped; the first one seen wins ties.
    pub fn fittest(&self) -> Option<&Individual> {
        let mut best: Option<&Individual> = None;
        for ind in self.individuals.iter().filter(|ind| ind.is_evaluated()) {
            match best {
                Some(b) if ind.fitness() <= b.fitness() => {}
                _ => best = Some(ind),
            }
        }
        best
    }
}

/// Blends two children gene by gene.
fn mate<R: Rng>(
    pair: &Parents<'_>,
    beta: f64,
    crossover_rate: f64,
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>) {
    let dad = pair.dad().chromosome();
    let mom = pair.mom().chromosome();
    let mut first = Vec::with_capacity(dad.len());
    let mut second = Vec::with_capacity(dad.len());

    for (&d, &m) in dad.iter().zip(mom) {
        if rng.random_range(0.0..1.0) < crossover_rate {
            first.push(beta * d + (1.0 - beta) * m);
            second.push(beta * m + (1.0 - beta) * d);
        } else {
            first.push(beta * m + (1.0 - beta) * d);
            second.push(beta * d + (1.0 - beta) * m);
        }
    }

    (first, second)
}
