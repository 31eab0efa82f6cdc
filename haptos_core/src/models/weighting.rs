// haptos_core/src/models/weighting.rs

use dyn_clone::DynClone;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::FilterError;

/// Below this norm a candidate counts as the null hypothesis for force weighting.
const FORCE_NULL_NORM: f64 = 0.1;
/// Below this norm a candidate counts as the null hypothesis for velocity weighting.
const VELOCITY_NULL_NORM: f64 = 0.001;
/// Score of the null hypothesis under any velocity measurement.
const NULL_VELOCITY_SCORE: f64 = 0.5;

/// A `[low, high]` pair of thresholds over which a score ramps between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Both bounds multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.low * factor, self.high * factor)
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn validate(&self, name: &'static str) -> Result<(), FilterError> {
        if self.low.is_finite() && self.high.is_finite() && self.high > self.low {
            Ok(())
        } else {
            Err(FilterError::InvalidBand {
                name,
                low: self.low,
                high: self.high,
            })
        }
    }
}

// =========================================================================
// == Piecewise-linear weighting ==
// =========================================================================

/// How well `direction` explains `measured_force`, in `[0, 1]`.
///
/// The null direction scores 1 at zero force and falls linearly to 0 at `high`.
/// A contact direction scores by the force projected onto it, ramping from 0 at
/// `low` to 1 at `high`.
pub fn weight_force(
    direction: &Vector3<f64>,
    measured_force: &Vector3<f64>,
    low: f64,
    high: f64,
) -> f64 {
    let raw = if direction.norm() < FORCE_NULL_NORM {
        1.0 - (measured_force.norm() - low) / (high - low)
    } else {
        (direction.dot(measured_force) - low) / (high - low)
    };
    raw.clamp(0.0, 1.0)
}

/// How well `direction` explains `measured_velocity`, in `[0, 1]`.
///
/// Motion along a constrained direction is evidence against it: the score drops
/// from 1 at `low` to 0 at `high` of velocity along `direction`. The null
/// direction always scores 0.5.
pub fn weight_velocity(
    direction: &Vector3<f64>,
    measured_velocity: &Vector3<f64>,
    low: f64,
    high: f64,
) -> f64 {
    let raw = if direction.norm() > VELOCITY_NULL_NORM {
        1.0 - (direction.dot(measured_velocity) - low) / (high - low)
    } else {
        NULL_VELOCITY_SCORE
    };
    raw.clamp(0.0, 1.0)
}

// =========================================================================
// == Weight Model Trait ==
// =========================================================================

/// The measurement model of the filter: scores one candidate against the
/// sensed force and velocity.
pub trait WeightModel: DynClone + Debug + Send + Sync {
    fn force_weight(
        &self,
        direction: &Vector3<f64>,
        measured_force: &Vector3<f64>,
        band: &Band,
    ) -> f64;

    fn velocity_weight(
        &self,
        direction: &Vector3<f64>,
        measured_velocity: &Vector3<f64>,
        band: &Band,
    ) -> f64;

    /// Joint likelihood of one candidate; the two terms are treated as independent.
    fn weight(
        &self,
        direction: &Vector3<f64>,
        measured_force: &Vector3<f64>,
        measured_velocity: &Vector3<f64>,
        force_band: &Band,
        velocity_band: &Band,
    ) -> f64 {
        self.force_weight(direction, measured_force, force_band)
            * self.velocity_weight(direction, measured_velocity, velocity_band)
    }
}

dyn_clone::clone_trait_object!(WeightModel);

/// Linear ramps clamped to `[0, 1]`. The default model.
#[derive(Debug, Clone, Copy, Default)]
pub struct PiecewiseLinear;

impl WeightModel for PiecewiseLinear {
    fn force_weight(
        &self,
        direction: &Vector3<f64>,
        measured_force: &Vector3<f64>,
        band: &Band,
    ) -> f64 {
        weight_force(direction, measured_force, band.low, band.high)
    }

    fn velocity_weight(
        &self,
        direction: &Vector3<f64>,
        measured_velocity: &Vector3<f64>,
        band: &Band,
    ) -> f64 {
        weight_velocity(direction, measured_velocity, band.low, band.high)
    }
}

/// Smooth `tanh` ramps. The null force score saturates much faster than the
/// contact score, and the velocity score ignores the low threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hyperbolic;

impl WeightModel for Hyperbolic {
    fn force_weight(
        &self,
        direction: &Vector3<f64>,
        measured_force: &Vector3<f64>,
        band: &Band,
    ) -> f64 {
        let raw = if direction.norm() < FORCE_NULL_NORM {
            1.0 - (10.0 * (measured_force.norm() - band.low) / band.width()).tanh()
        } else {
            (2.0 * (direction.dot(measured_force) - band.low) / band.width()).tanh()
        };
        raw.clamp(0.0, 1.0)
    }

    fn velocity_weight(
        &self,
        direction: &Vector3<f64>,
        measured_velocity: &Vector3<f64>,
        band: &Band,
    ) -> f64 {
        let raw = if direction.norm() > VELOCITY_NULL_NORM {
            1.0 - (2.0 * direction.dot(measured_velocity) / band.high).tanh().abs()
        } else {
            NULL_VELOCITY_SCORE
        };
        raw.clamp(0.0, 1.0)
    }
}

/// Selects the measurement model from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingProfile {
    #[default]
    Piecewise,
    Hyperbolic,
}

impl WeightingProfile {
    pub fn build(self) -> Box<dyn WeightModel> {
        match self {
            WeightingProfile::Piecewise => Box::new(PiecewiseLinear),
            WeightingProfile::Hyperbolic => Box::new(Hyperbolic),
        }
    }
}
