//! Error type for the SGA core.

/// Errors reported by the SGA core.
///
/// Only contract violations surface as errors. Numeric edge cases such as
/// an empty survivor set or an odd number of offspring slots degrade to
/// no-ops instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SgaError {
    /// A pair selection needed at least two survivors.
    #[error("pair selection requires at least 2 survivors, got {survivors}")]
    NotEnoughSurvivors { survivors: usize },

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A genome had a different length than the population expects.
    #[error("genome length mismatch: expected {expected}, got {actual}")]
    GenomeLengthMismatch { expected: usize, actual: usize },

    /// No valid layout was found among the initial random genomes.
    #[error("no valid layout in the initial population after {attempts} redraws")]
    NoValidLayout { attempts: usize },
}
