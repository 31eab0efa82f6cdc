// haptos_core/src/models/policy.rs

use crate::config::FilterConfig;

/// The behavior switches implied by the force-space dimension hint.
///
/// Derived once at the start of every update and handed to both the
/// augmentation and the resampling stage, so the two always agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclePolicy {
    /// Multiplier applied to both bounds of the injection force band.
    pub injection_force_scale: f64,
    /// Penalize clustered candidates before resampling.
    pub proximity_penalty: bool,
}

impl CyclePolicy {
    /// Hint 0 or 1: plain bands, no penalty.
    /// Hint 2: widened injection force band.
    /// Hint 3 and above: widened band and proximity penalty.
    pub fn from_dimension(dimension: usize, widened_scale: f64) -> Self {
        match dimension {
            0 | 1 => Self {
                injection_force_scale: 1.0,
                proximity_penalty: false,
            },
            2 => Self {
                injection_force_scale: widened_scale,
                proximity_penalty: false,
            },
            _ => Self {
                injection_force_scale: widened_scale,
                proximity_penalty: true,
            },
        }
    }

    pub fn for_config(config: &FilterConfig) -> Self {
        Self::from_dimension(config.force_space_dimension, config.injection_force_scale)
    }
}
