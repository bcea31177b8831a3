//! Parent-pair selection among survivors.
//!
//! Survivors are the elite prefix of a population sorted by descending
//! fitness. Both strategies return a [`Parents`] pair whose members are
//! distinct survivors.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, ch. 1 (roulette wheel)
//! - Miller & Goldberg (1995), "Genetic Algorithms, Tournament Selection,
//!   and the Effects of Noise"

use super::error::SgaError;
use super::individual::Individual;
use super::parents::Parents;
use rand::Rng;
use std::cmp::Ordering;

/// Consecutive failed draws of `mom` tolerated before falling back to a
/// uniform pick among the other survivors.
pub(crate) const MAX_REDRAWS: usize = 64;

/// Strategy for choosing mating pairs from the survivors.
///
/// All strategies assume **maximization** (higher fitness = better).
///
/// # Examples
///
/// ```
/// use u_sga::sga::SelectionMethod;
///
/// let sel = SelectionMethod::default();
/// assert_eq!(sel, SelectionMethod::RouletteWheel);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMethod {
    /// Fitness-proportionate selection.
    ///
    /// Survivor weights are their fitness shifted by the fitness of the
    /// first non-survivor, so the weakest survivors get the smallest share.
    ///
    /// # Complexity
    /// O(n) per draw (linear scan)
    #[default]
    RouletteWheel,

    /// Binary tournament: draw two distinct survivors (the last survivor is
    /// left out of the draw), keep the fitter one.
    ///
    /// # Complexity
    /// O(1) per draw
    Tournament,
}

impl SelectionMethod {
    /// Selects a pair of distinct survivors.
    ///
    /// `lowest_fitness` is the reference used to shift roulette weights to
    /// be non-negative; tournaments ignore it.
    ///
    /// # Errors
    /// Returns [`SgaError::NotEnoughSurvivors`] if fewer than two survivors
    /// are given.
    pub fn select_pair<'a, R: Rng>(
        &self,
        survivors: &'a [Individual],
        lowest_fitness: f64,
        rng: &mut R,
    ) -> Result<Parents<'a>, SgaError> {
        let n = survivors.len();
        if n < 2 {
            return Err(SgaError::NotEnoughSurvivors { survivors: n });
        }

        let (dad, mom) = match self {
            SelectionMethod::RouletteWheel => {
                let sum = shifted_sum(survivors, lowest_fitness);
                let dad = roulette(survivors, lowest_fitness, sum, rng);
                let mom = redraw_until_distinct(n, dad, rng, |rng: &mut R| {
                    roulette(survivors, lowest_fitness, sum, rng)
                });
                (dad, mom)
            }
            SelectionMethod::Tournament => {
                let dad = tournament(survivors, rng);
                let mom = redraw_until_distinct(n, dad, rng, |rng: &mut R| {
                    tournament(survivors, rng)
                });
                (dad, mom)
            }
        };
        Ok(Parents::new(&survivors[dad], &survivors[mom]))
    }
}

/// How candidate pairs are checked against the pairs already chosen in a
/// crossover call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairFiltering {
    /// Pairs are compared by instance. Every candidate is a fresh pair, so
    /// none is ever rejected and the same two survivors may mate repeatedly.
    #[default]
    Identity,

    /// Pairs are compared with [`Parents`] equality (same two survivors in
    /// either order). Once every distinct pair has been used, duplicates
    /// are admitted again so offspring slots can still be filled; a
    /// crossover also admits a duplicate after `MAX_REDRAWS` consecutive
    /// rejections.
    Structural,
}

impl PairFiltering {
    /// Whether `candidate` may join `pairs`.
    pub fn admits(&self, pairs: &[Parents<'_>], candidate: &Parents<'_>, survivors: usize) -> bool {
        match self {
            PairFiltering::Identity => true,
            PairFiltering::Structural => {
                if !pairs.contains(candidate) {
                    return true;
                }
                let max_distinct = survivors * survivors.saturating_sub(1) / 2;
                distinct_pairs(pairs) >= max_distinct
            }
        }
    }
}

fn distinct_pairs(pairs: &[Parents<'_>]) -> usize {
    pairs
        .iter()
        .enumerate()
        .filter(|(i, p)| !pairs[..*i].contains(p))
        .count()
}

/// Sum of survivor fitness shifted by `lowest_fitness`.
fn shifted_sum(survivors: &[Individual], lowest_fitness: f64) -> f64 {
    survivors
        .iter()
        .map(|ind| ind.fitness() - lowest_fitness)
        .sum()
}

/// Spins the wheel once.
///
/// A non-positive or non-finite `sum` leaves nothing to be proportional to,
/// so the pick is uniform.
fn roulette<R: Rng>(survivors: &[Individual], lowest_fitness: f64, sum: f64, rng: &mut R) -> usize {
    let n = survivors.len();
    if !(sum > 0.0 && sum.is_finite()) {
        return rng.random_range(0..n);
    }

    let pointer = rng.random_range(0.0..sum);
    let mut running = 0.0;
    for (i, ind) in survivors.iter().enumerate() {
        running += ind.fitness() - lowest_fitness;
        if running >= pointer {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

/// Binary tournament over `[0, n-1)`; with only two survivors the range
/// covers both.
fn tournament<R: Rng>(survivors: &[Individual], rng: &mut R) -> usize {
    let n = survivors.len();
    let upper = if n > 2 { n - 1 } else { n };

    let a = rng.random_range(0..upper);
    let mut b = rng.random_range(0..upper);
    while b == a {
        b = rng.random_range(0..upper);
    }

    if survivors[b].compare(&survivors[a]) == Ordering::Greater {
        b
    } else {
        a
    }
}

/// Repeats `draw` until it yields an index other than `dad`.
fn redraw_until_distinct<R: Rng>(
    n: usize,
    dad: usize,
    rng: &mut R,
    mut draw: impl FnMut(&mut R) -> usize,
) -> usize {
    for _ in 0..MAX_REDRAWS {
        let mom = draw(rng);
        if mom != dad {
            return mom;
        }
    }

    log::debug!("mom redrawn {MAX_REDRAWS} times without leaving dad {dad}; picking uniformly");
    let i = rng.random_range(0..n - 1);
    if i >= dad {
        i + 1
    } else {
        i
    }
}
