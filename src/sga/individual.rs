//! Candidate solutions: a real-valued chromosome and its fitness.
//!
//! Genes are conventionally normalized to `[0, 1)`. The caller decodes them
//! into layout parameters and reports a fitness back; until then the fitness
//! is NaN and the individual counts as unevaluated.

use rand::Rng;
use std::cmp::Ordering;

/// Snapping rule applied every time a gene is written.
///
/// # Examples
///
/// ```
/// use u_sga::sga::Discretization;
///
/// assert_eq!(Discretization::Continuous.apply(0.337), 0.337);
/// assert_eq!(Discretization::Steps(4).apply(0.6), 0.5);
/// assert_eq!(Discretization::Steps(4).apply(1.2), 0.75);
/// ```
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Discretization {
    /// Genes are stored exactly as written.
    #[default]
    Continuous,

    /// Genes are restricted to the `k` lattice points `{0, 1/k, …, (k-1)/k}`.
    ///
    /// Written values are clamped into `[0, 1)` and floored onto the
    /// lattice. `Steps(0)` behaves like [`Continuous`](Self::Continuous).
    Steps(usize),

    /// Caller-supplied snapping function.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(fn(f64) -> f64),
}

impl Discretization {
    /// Snaps `value` according to this rule.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Discretization::Continuous | Discretization::Steps(0) => value,
            Discretization::Steps(k) => {
                let k = k as f64;
                let lattice = (value * k).floor().clamp(0.0, k - 1.0);
                lattice / k
            }
            Discretization::Custom(snap) => snap(value),
        }
    }
}

/// A single candidate solution.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    chromosome: Vec<f64>,
    fitness: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    discretization: Discretization,
}

impl Individual {
    /// Creates an individual whose genes are drawn uniformly from `[0, 1)`.
    pub fn random<R: Rng>(length: usize, discretization: Discretization, rng: &mut R) -> Self {
        let chromosome = (0..length)
            .map(|_| discretization.apply(rng.random_range(0.0..1.0)))
            .collect();
        Self {
            chromosome,
            fitness: f64::NAN,
            discretization,
        }
    }

    /// Creates an individual with every gene set to zero.
    pub fn zeroed(length: usize, discretization: Discretization) -> Self {
        Self {
            chromosome: vec![discretization.apply(0.0); length],
            fitness: f64::NAN,
            discretization,
        }
    }

    /// Three-way comparison by fitness: greater fitness compares greater.
    ///
    /// Unevaluated (NaN) fitness compares below every evaluated value, so a
    /// descending sort pushes unevaluated individuals to the end.
    pub fn compare(&self, other: &Individual) -> Ordering {
        match (self.fitness.is_nan(), other.fitness.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .fitness
                .partial_cmp(&other.fitness)
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Euclidean distance between the two chromosomes.
    ///
    /// # Panics
    /// Panics if the chromosomes have different lengths.
    pub fn distance(&self, other: &Individual) -> f64 {
        assert_eq!(
            self.chromosome.len(),
            other.chromosome.len(),
            "chromosomes must have equal length"
        );
        self.chromosome
            .iter()
            .zip(&other.chromosome)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Returns gene `i`.
    pub fn gene(&self, i: usize) -> f64 {
        self.chromosome[i]
    }

    /// Writes gene `i`, snapped by the configured discretization.
    pub fn set_gene(&mut self, i: usize, value: f64) {
        self.chromosome[i] = self.discretization.apply(value);
    }

    /// Overwrites the whole chromosome with a copy of `other`'s genes.
    ///
    /// The fitness is left as it was.
    ///
    /// # Panics
    /// Panics if the chromosomes have different lengths.
    pub fn copy_genes(&mut self, other: &Individual) {
        self.chromosome.copy_from_slice(&other.chromosome);
    }

    pub fn chromosome(&self) -> &[f64] {
        &self.chromosome
    }

    pub fn len(&self) -> usize {
        self.chromosome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosome.is_empty()
    }

    pub fn discretization(&self) -> Discretization {
        self.discretization
    }

    /// Current fitness; NaN until evaluated.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Marks the fitness as unevaluated.
    pub fn invalidate_fitness(&mut self) {
        self.fitness = f64::NAN;
    }

    pub fn is_evaluated(&self) -> bool {
        !self.fitness.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn with_genes(genes: &[f64], fitness: f64) -> Individual {
        let mut ind = Individual::zeroed(genes.len(), Discretization::Continuous);
        for (i, &g) in genes.iter().enumerate() {
            ind.set_gene(i, g);
        }
        ind.set_fitness(fitness);
        ind
    }

    #[test]
    fn test_random_genes_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let ind = Individual::random(100, Discretization::Continuous, &mut rng);
        assert_eq!(ind.len(), 100);
        assert!(ind.chromosome().iter().all(|&g| (0.0..1.0).contains(&g)));
        assert!(!ind.is_evaluated());
    }

    #[test]
    fn test_random_genes_on_lattice() {
        let mut rng = StdRng::seed_from_u64(42);
        let ind = Individual::random(50, Discretization::Steps(5), &mut rng);
        for &g in ind.chromosome() {
            let scaled = g * 5.0;
            assert!((scaled - scaled.round()).abs() < 1e-12, "gene {g} off lattice");
            assert!(g < 1.0);
        }
    }

    #[test]
    fn test_compare_greater_fitness_is_greater() {
        let a = with_genes(&[0.1], 2.0);
        let b = with_genes(&[0.2], 1.0);
        assert_eq!(a.compare(&b), Ordering::Greater);
        assert_eq!(b.compare(&a), Ordering::Less);
        assert_eq!(a.compare(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_compare_nan_is_lowest() {
        let evaluated = with_genes(&[0.1], -1e9);
        let pending = Individual::zeroed(1, Discretization::Continuous);
        assert_eq!(pending.compare(&evaluated), Ordering::Less);
        assert_eq!(evaluated.compare(&pending), Ordering::Greater);
        assert_eq!(pending.compare(&pending.clone()), Ordering::Equal);
    }

    #[test]
    fn test_distance_symmetric_and_zero_on_identity() {
        let a = with_genes(&[0.0, 0.0], 0.0);
        let b = with_genes(&[0.3, 0.4], 0.0);
        assert!((a.distance(&b) - 0.5).abs() < 1e-12);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(b.distance(&b.clone()), 0.0);
    }

    #[test]
    fn test_set_gene_snaps() {
        let mut ind = Individual::zeroed(2, Discretization::Steps(10));
        ind.set_gene(0, 0.456);
        ind.set_gene(1, -3.0);
        assert!((ind.gene(0) - 0.4).abs() < 1e-12);
        assert_eq!(ind.gene(1), 0.0);
    }

    #[test]
    fn test_set_gene_continuous_accepts_any_real() {
        let mut ind = Individual::zeroed(1, Discretization::Continuous);
        ind.set_gene(0, 1.75);
        assert_eq!(ind.gene(0), 1.75);
    }

    #[test]
    fn test_custom_discretization() {
        fn halves(v: f64) -> f64 {
            (v * 2.0).round() / 2.0
        }
        let mut ind = Individual::zeroed(1, Discretization::Custom(halves));
        ind.set_gene(0, 0.7);
        assert_eq!(ind.gene(0), 0.5);
    }

    #[test]
    fn test_copy_genes_keeps_fitness() {
        let mut a = with_genes(&[0.1, 0.2, 0.3], 5.0);
        let b = with_genes(&[0.7, 0.8, 0.9], 1.0);
        a.copy_genes(&b);
        assert_eq!(a.chromosome(), b.chromosome());
        assert_eq!(a.fitness(), 5.0);
    }

    #[test]
    fn test_invalidate_fitness() {
        let mut a = with_genes(&[0.1], 3.0);
        assert!(a.is_evaluated());
        a.invalidate_fitness();
        assert!(!a.is_evaluated());
    }
}
