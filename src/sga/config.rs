//! SGA configuration.
//!
//! [`SgaConfig`] holds the population shape and the per-generation rates
//! that the [`SgaRunner`](super::SgaRunner) passes to the population.

use super::error::SgaError;
use super::individual::Discretization;
use super::selection::{PairFiltering, SelectionMethod};

/// Configuration for the simple genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_sga::sga::SgaConfig;
///
/// let config = SgaConfig::new(8);
/// assert_eq!(config.chromosome_length, 8);
/// assert_eq!(config.population_size, 50);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_sga::sga::{SelectionMethod, SgaConfig};
///
/// let config = SgaConfig::new(4)
///     .with_population_size(10)
///     .with_selection_rate(0.3)
///     .with_crossover_rate(1.0)
///     .with_selection_method(SelectionMethod::Tournament)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SgaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of genes per chromosome.
    pub chromosome_length: usize,

    /// Strategy for pairing survivors.
    pub selection_method: SelectionMethod,

    /// How repeated pairs are handled within one crossover call.
    pub pair_filtering: PairFiltering,

    /// Gene snapping rule.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub discretization: Discretization,

    /// Fraction of the population kept as survivors (0.0–1.0).
    ///
    /// `floor(selection_rate * population_size)` individuals survive.
    pub selection_rate: f64,

    /// Per-gene probability of the dad-first blend (0.0–1.0).
    pub crossover_rate: f64,

    /// Fraction of the population mutated each generation (0.0–1.0).
    ///
    /// 0.0 disables mutation; any positive rate mutates at least one
    /// individual.
    pub mutation_rate: f64,

    /// Per-gene relative spread below which the elite counts as converged.
    pub convergence_threshold: f64,

    /// Niche radius for fitness sharing. `None` disables sharing.
    pub niche_radius: Option<f64>,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Whether to evaluate individuals in parallel (requires the `parallel`
    /// feature; ignored otherwise).
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl SgaConfig {
    /// Creates a configuration for chromosomes of the given length.
    pub fn new(chromosome_length: usize) -> Self {
        Self {
            population_size: 50,
            chromosome_length,
            selection_method: SelectionMethod::default(),
            pair_filtering: PairFiltering::default(),
            discretization: Discretization::default(),
            selection_rate: 0.3,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            convergence_threshold: 0.01,
            niche_radius: None,
            max_generations: 200,
            parallel: false,
            seed: None,
        }
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_selection_method(mut self, method: SelectionMethod) -> Self {
        self.selection_method = method;
        self
    }

    pub fn with_pair_filtering(mut self, filtering: PairFiltering) -> Self {
        self.pair_filtering = filtering;
        self
    }

    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    pub fn with_selection_rate(mut self, rate: f64) -> Self {
        self.selection_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the convergence threshold (negative values clamp to 0).
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold.max(0.0);
        self
    }

    /// Enables fitness sharing with niche radius `sigma`.
    pub fn with_niche_radius(mut self, sigma: f64) -> Self {
        self.niche_radius = Some(sigma);
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of survivors implied by the selection rate.
    pub fn survivor_count(&self) -> usize {
        (self.selection_rate * self.population_size as f64).floor() as usize
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SgaError> {
        if self.population_size < 3 {
            return Err(SgaError::InvalidConfig(
                "population_size must be at least 3".into(),
            ));
        }
        if self.chromosome_length == 0 {
            return Err(SgaError::InvalidConfig(
                "chromosome_length must be at least 1".into(),
            ));
        }
        let survivors = self.survivor_count();
        if survivors < 2 {
            return Err(SgaError::InvalidConfig(format!(
                "selection_rate ({}) keeps {survivors} survivors; at least 2 are needed to mate",
                self.selection_rate
            )));
        }
        if survivors >= self.population_size {
            return Err(SgaError::InvalidConfig(
                "selection_rate too high: survivors fill entire population".into(),
            ));
        }
        if self.max_generations == 0 {
            return Err(SgaError::InvalidConfig(
                "max_generations must be at least 1".into(),
            ));
        }
        if self.convergence_threshold < 0.0 {
            return Err(SgaError::InvalidConfig(
                "convergence_threshold must be non-negative".into(),
            ));
        }
        if let Some(sigma) = self.niche_radius {
            if !(sigma > 0.0) {
                return Err(SgaError::InvalidConfig(format!(
                    "niche_radius must be positive, got {sigma}"
                )));
            }
        }
        Ok(())
    }
}
