//! Caller contract for the generation loop.
//!
//! The optimizer core never decodes genomes. [`LayoutProblem`] is where the
//! caller turns a chromosome into a layout, scores it, and decides whether
//! it is physically legal.

/// Defines a layout optimization problem for [`SgaRunner`](super::SgaRunner).
///
/// # Thread Safety
///
/// `LayoutProblem` must be `Send + Sync` because the runner may evaluate
/// individuals in parallel using rayon (`parallel` feature).
///
/// # Implementing
///
/// ```ignore
/// struct TiltSearch;
///
/// impl LayoutProblem for TiltSearch {
///     fn evaluate(&self, genes: &[f64]) -> f64 {
///         annual_yield(decode(genes))
///     }
///
///     fn is_valid(&self, genes: &[f64]) -> bool {
///         !panels_overlap(decode(genes))
///     }
/// }
/// ```
pub trait LayoutProblem: Send + Sync {
    /// Scores a chromosome. Higher is better.
    ///
    /// This is typically the most expensive operation.
    fn evaluate(&self, genes: &[f64]) -> f64;

    /// Whether the chromosome decodes to a legal layout.
    ///
    /// Invalid individuals are rolled back to the last accepted generation.
    /// The default accepts everything.
    fn is_valid(&self, _genes: &[f64]) -> bool {
        true
    }

    /// Called at the end of each generation with the best raw fitness so far.
    fn on_generation(&self, _generation: usize, _best_fitness: f64) {}
}
