// haptos_core/src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::models::weighting::{Band, WeightingProfile};

/// # FilterConfig
/// Every tunable of the force-space particle filter.
///
/// Missing fields fall back to the defaults below when deserialized, so a
/// scenario file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Mean of the per-axis diffusion noise.
    pub scatter_mean: f64,
    /// Standard deviation of the per-axis diffusion noise.
    pub scatter_std: f64,
    /// Share of a slot's previous weight blended into its new weight, in `[0, 1]`.
    pub memory_coefficient: f64,
    /// Kept for callers that set it; no weighting or resampling step reads it.
    pub friction_coefficient: f64,

    /// Thresholds for measurement weighting.
    pub force_band: Band,
    pub velocity_band: Band,

    /// Wider thresholds, only used to decide how many particles to inject.
    pub injection_force_band: Band,
    pub injection_velocity_band: Band,

    /// How many independent directions the contact constraint is believed to span.
    pub force_space_dimension: usize,
    /// Multiplier on `injection_force_band` once the dimension hint reaches 2.
    /// A tuned heuristic, not a derived quantity.
    pub injection_force_scale: f64,

    /// Zero "origin anchor" points padded into the PCA input, as a fraction of
    /// the population size.
    pub pca_origin_padding: f64,

    pub weighting: WeightingProfile,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            scatter_mean: 0.0,
            scatter_std: 0.005,
            memory_coefficient: 0.0,
            friction_coefficient: 0.0,
            force_band: Band::new(0.0, 5.0),
            velocity_band: Band::new(0.005, 0.05),
            injection_force_band: Band::new(3.0, 10.0),
            injection_velocity_band: Band::new(0.0, 0.01),
            force_space_dimension: 0,
            injection_force_scale: 3.0,
            pca_origin_padding: 0.5,
            weighting: WeightingProfile::default(),
        }
    }
}

impl FilterConfig {
    /// Rejects any configuration that would make weighting or resampling undefined.
    pub fn validate(&self) -> Result<(), FilterError> {
        self.force_band.validate("force_band")?;
        self.velocity_band.validate("velocity_band")?;
        self.injection_force_band.validate("injection_force_band")?;
        self.injection_velocity_band.validate("injection_velocity_band")?;
        let velocity_high = self.velocity_band.high;
        if self.weighting == WeightingProfile::Hyperbolic && velocity_high <= 0.0 {
            return Err(FilterError::InvalidHyperbolicVelocityBand(velocity_high));
        }

        let (mean, std) = (self.scatter_mean, self.scatter_std);
        if !mean.is_finite() || !std.is_finite() || std < 0.0 {
            return Err(FilterError::InvalidScatter { mean, std });
        }
        let mu = self.memory_coefficient;
        if !(0.0..=1.0).contains(&mu) {
            return Err(FilterError::InvalidMemoryCoefficient(mu));
        }
        let scale = self.injection_force_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(FilterError::InvalidInjectionScale(scale));
        }
        let padding = self.pca_origin_padding;
        if !padding.is_finite() || padding < 0.0 {
            return Err(FilterError::InvalidPcaPadding(padding));
        }
        Ok(())
    }
}
