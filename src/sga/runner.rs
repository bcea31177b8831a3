//! SGA generation loop.
//!
//! [`SgaRunner`] drives a [`Population`] through the per-generation cycle:
//! evaluation → accept or roll back → (optional) fitness sharing →
//! selection + crossover → convergence test → mutation → repeat.

use super::config::SgaConfig;
use super::error::SgaError;
use super::individual::Individual;
use super::population::Population;
use super::types::LayoutProblem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rounds of redrawing invalid genomes in the initial population.
const MAX_INITIAL_REDRAWS: usize = 64;

/// Result of an SGA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SgaResult {
    /// Genes of the best valid individual seen during the run.
    ///
    /// Empty if no individual was ever evaluated.
    pub best_genes: Vec<f64>,

    /// Raw fitness of `best_genes` (NaN if none).
    pub best_fitness: f64,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the elite converged.
    pub converged: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Total number of individuals rolled back to a saved genome.
    pub rollbacks: usize,

    /// Best raw fitness at the end of each generation.
    pub fitness_history: Vec<f64>,
}

/// Executes the SGA generation loop.
///
/// # Usage
///
/// ```
/// use u_sga::sga::{LayoutProblem, SgaConfig, SgaRunner};
///
/// struct Target;
///
/// impl LayoutProblem for Target {
///     fn evaluate(&self, genes: &[f64]) -> f64 {
///         -genes.iter().map(|g| (g - 0.25) * (g - 0.25)).sum::<f64>()
///     }
/// }
///
/// let config = SgaConfig::new(3).with_max_generations(20).with_seed(42);
/// let result = SgaRunner::run(&Target, &config).unwrap();
/// assert_eq!(result.best_genes.len(), 3);
/// ```
pub struct SgaRunner;

impl SgaRunner {
    /// Runs the SGA.
    ///
    /// # Errors
    /// Returns [`SgaError::InvalidConfig`] if the configuration does not
    /// validate, or [`SgaError::NoValidLayout`] if the initial population
    /// never produced a valid layout.
    pub fn run<P: LayoutProblem>(problem: &P, config: &SgaConfig) -> Result<SgaResult, SgaError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the SGA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation and returns the best solution found so
    /// far.
    pub fn run_with_cancel<P: LayoutProblem>(
        problem: &P,
        config: &SgaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SgaResult, SgaError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let mut population = Population::from_config(config, &mut rng)?;

        let mut best: Option<Individual> = None;
        let mut fitness_history = Vec::with_capacity(config.max_generations);
        let mut generations = 0usize;
        let mut rollbacks = 0usize;
        let mut converged = false;
        let mut cancelled = false;

        for gen in 0..config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            // 1. Evaluate new genomes and flag invalid layouts
            evaluate_pending(problem, &mut population, config.parallel);
            if gen == 0 {
                // Nothing has been accepted yet, so there is nothing to roll
                // back to.
                repair_initial(problem, &mut population, config.parallel, &mut rng)?;
            }

            // 2. Roll invalid slots back, then accept the generation
            let violations = population.violation_count();
            if violations > 0 {
                rollbacks += population.restore_genes();
                log::warn!("generation {gen}: rolled back {violations} invalid layouts");
            }
            population.save_genes();

            // 3. Track best (raw fitness, before sharing)
            if let Some(fittest) = population.fittest() {
                let improved = best
                    .as_ref()
                    .is_none_or(|b| fittest.fitness() > b.fitness());
                if improved {
                    best = Some(fittest.clone());
                }
            }
            let best_fitness = best.as_ref().map_or(f64::NAN, |b| b.fitness());
            fitness_history.push(best_fitness);
            problem.on_generation(gen + 1, best_fitness);
            log::debug!("generation {}: best fitness {best_fitness}", gen + 1);

            // 4. Fitness sharing
            if let Some(sigma) = config.niche_radius {
                share_fitness(&mut population, sigma);
            }

            // 5. Selection + crossover
            population.evolve(config.selection_rate, config.crossover_rate, &mut rng)?;
            generations = gen + 1;

            if population.is_nominally_converged(config.convergence_threshold) {
                converged = true;
                break;
            }

            // 6. Mutation
            population.mutate(config.mutation_rate, &mut rng);

            // Shared values must not be shared again: re-score everyone.
            if config.niche_radius.is_some() {
                for ind in population.individuals_mut() {
                    ind.invalidate_fitness();
                }
            }
        }

        let (best_genes, best_fitness) = match best {
            Some(b) => (b.chromosome().to_vec(), b.fitness()),
            None => (Vec::new(), f64::NAN),
        };

        log::info!(
            "SGA finished after {generations} generations (converged: {converged}, cancelled: {cancelled}), best fitness {best_fitness}"
        );

        Ok(SgaResult {
            best_genes,
            best_fitness,
            generations,
            converged,
            cancelled,
            rollbacks,
            fitness_history,
        })
    }
}

/// Scores every unevaluated individual and records its validity.
///
/// Already-evaluated individuals hold accepted genomes, so their flags are
/// cleared.
fn evaluate_pending<P: LayoutProblem>(problem: &P, population: &mut Population, parallel: bool) {
    let scores = score_pending(problem, population.individuals(), parallel);
    for (i, score) in scores.into_iter().enumerate() {
        match score {
            Some((fitness, valid)) => {
                population.set_fitness(i, fitness);
                population.set_violation(i, !valid);
            }
            None => population.set_violation(i, false),
        }
    }
}

fn score_one<P: LayoutProblem>(problem: &P, ind: &Individual) -> Option<(f64, bool)> {
    if ind.is_evaluated() {
        return None;
    }
    let genes = ind.chromosome();
    Some((problem.evaluate(genes), problem.is_valid(genes)))
}

#[cfg(feature = "parallel")]
fn score_pending<P: LayoutProblem>(
    problem: &P,
    individuals: &[Individual],
    parallel: bool,
) -> Vec<Option<(f64, bool)>> {
    use rayon::prelude::*;

    if parallel {
        individuals
            .par_iter()
            .map(|ind| score_one(problem, ind))
            .collect()
    } else {
        individuals.iter().map(|ind| score_one(problem, ind)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn score_pending<P: LayoutProblem>(
    problem: &P,
    individuals: &[Individual],
    _parallel: bool,
) -> Vec<Option<(f64, bool)>> {
    individuals.iter().map(|ind| score_one(problem, ind)).collect()
}

/// Redraws invalid initial genomes until every slot is valid.
///
/// After `MAX_INITIAL_REDRAWS` rounds, slots that are still invalid receive
/// a copy of the fittest valid individual.
///
/// # Errors
/// Returns [`SgaError::NoValidLayout`] if no valid genome was ever drawn.
fn repair_initial<P: LayoutProblem, R: Rng>(
    problem: &P,
    population: &mut Population,
    parallel: bool,
    rng: &mut R,
) -> Result<(), SgaError> {
    let mut redrawn = 0;
    for _ in 0..MAX_INITIAL_REDRAWS {
        let invalid = flagged(population);
        if invalid.is_empty() {
            break;
        }
        for &i in &invalid {
            population.randomize(i, rng);
        }
        redrawn += invalid.len();
        evaluate_pending(problem, population, parallel);
    }

    let invalid = flagged(population);
    if !invalid.is_empty() {
        let donor = population
            .individuals()
            .iter()
            .enumerate()
            .filter(|&(i, ind)| !population.violations()[i] && ind.is_evaluated())
            .max_by(|(_, a), (_, b)| a.compare(b))
            .map(|(i, _)| i)
            .ok_or(SgaError::NoValidLayout {
                attempts: MAX_INITIAL_REDRAWS,
            })?;
        for &i in &invalid {
            population.replicate(donor, i);
        }
        log::warn!(
            "{} initial layouts stayed invalid; copied slot {donor} into them",
            invalid.len()
        );
    }

    if redrawn > 0 {
        log::debug!("redrew {redrawn} invalid initial layouts");
    }
    Ok(())
}

fn flagged(population: &Population) -> Vec<usize> {
    population
        .violations()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v)
        .map(|(i, _)| i)
        .collect()
}

/// Lowers every evaluated fitness according to its niche count.
///
/// Fitness is measured from the lowest evaluated value, divided by the
/// niche count, and shifted back, so crowded individuals never score above
/// isolated ones with the same raw fitness, whatever the sign.
fn share_fitness(population: &mut Population, sigma: f64) {
    let floor = population
        .individuals()
        .iter()
        .filter(|ind| ind.is_evaluated())
        .map(|ind| ind.fitness())
        .fold(f64::INFINITY, f64::min);
    if !floor.is_finite() {
        return;
    }

    let niche_counts: Vec<f64> = population
        .individuals()
        .iter()
        .map(|ind| population.niche_count(ind, sigma))
        .collect();

    for (ind, count) in population.individuals_mut().iter_mut().zip(niche_counts) {
        if ind.is_evaluated() && count > 0.0 {
            ind.set_fitness(floor + (ind.fitness() - floor) / count);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
