//! Simple genetic algorithm (SGA) core.
//!
//! An elitist, real-coded GA for searching panel-array layouts. The core
//! only manipulates genomes: the caller decodes chromosomes into layouts,
//! scores them, and flags the ones that violate placement constraints.
//!
//! # Key Types
//!
//! - [`Individual`]: A chromosome of genes in `[0, 1)` and its fitness
//! - [`Parents`]: An unordered mating pair borrowed from the survivors
//! - [`Population`]: Selection, blend crossover, mutation, niching,
//!   convergence testing and constraint rollback
//! - [`SgaConfig`]: Population shape and per-generation rates
//! - [`SgaRunner`]: Drives a [`LayoutProblem`] through the generation loop
//!
//! # Randomness
//!
//! Every stochastic operation takes an explicit `&mut R: Rng`, so a seeded
//! generator makes runs replayable.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*
//! - Goldberg & Richardson (1987), "Genetic algorithms with sharing for
//!   multimodal function optimization"
//! - Haupt & Haupt (2004), *Practical Genetic Algorithms*, ch. 3
//!   (blending crossover for continuous parameters)

mod config;
mod error;
mod individual;
mod parents;
mod population;
mod runner;
mod selection;
mod types;

pub use config::SgaConfig;
pub use error::SgaError;
pub use individual::{Discretization, Individual};
pub use parents::Parents;
pub use population::Population;
pub use runner::{SgaResult, SgaRunner};
pub use selection::{PairFiltering, SelectionMethod};
pub use types::LayoutProblem;
