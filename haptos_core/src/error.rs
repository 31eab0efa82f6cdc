// haptos_core/src/error.rs

use thiserror::Error;

/// Everything that can go wrong while building or tuning a contact filter.
///
/// Configuration problems are reported eagerly (at construction or when a new
/// configuration is assigned). `DegenerateWeights` is the only variant the
/// per-cycle machinery produces, and the filter recovers from it internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("a particle filter needs at least one particle")]
    EmptyPopulation,

    #[error("threshold band '{name}' must satisfy high > low (got low = {low}, high = {high})")]
    InvalidBand {
        name: &'static str,
        low: f64,
        high: f64,
    },

    #[error("memory coefficient must lie in [0, 1] (got {0})")]
    InvalidMemoryCoefficient(f64),

    #[error("scatter noise must have a finite mean and a finite, non-negative std (got mean = {mean}, std = {std})")]
    InvalidScatter { mean: f64, std: f64 },

    #[error("PCA origin padding must be finite and non-negative (got {0})")]
    InvalidPcaPadding(f64),

    #[error("hyperbolic velocity weighting needs velocity_band.high > 0 (got {0})")]
    InvalidHyperbolicVelocityBand(f64),

    #[error("injection force scale must be finite and positive (got {0})")]
    InvalidInjectionScale(f64),

    #[error("candidate weights sum to zero or a non-finite value, resampling is undefined")]
    DegenerateWeights,
}
