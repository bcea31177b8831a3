//! Evolutionary optimizer core for solar panel-array layout search.
//!
//! Provides a simple genetic algorithm (SGA) over real-valued genomes:
//!
//! - **Elitist selection**: truncation to the best fraction of the population.
//! - **Pairing**: roulette wheel or binary tournament among survivors.
//! - **Blend crossover**: one coefficient per generation, two mirrored
//!   children per pair.
//! - **Mutation**: single-gene resets that never touch the best individual.
//! - **Niching**: triangular sharing counts for diversity preservation.
//! - **Rollback**: invalid layouts revert to the last accepted generation.
//!
//! # Architecture
//!
//! The crate contains no layout or energy model. Genome decoding, fitness
//! simulation and geometric validity checks are supplied by the caller,
//! either by driving a [`sga::Population`] directly or by implementing
//! [`sga::LayoutProblem`] for the [`sga::SgaRunner`] loop.

pub mod sga;
