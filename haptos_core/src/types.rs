// haptos_core/src/types.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
/// A hypothesized contact-force direction: a unit vector, or zero for "no contact".
pub type Particle = Vector3<f64>;

/// Particles whose norm is at or below this are treated as the null hypothesis
/// during diffusion.
pub const NULL_PARTICLE_NORM: f64 = 1e-3;

/// One slot of the filter's population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// The particle currently held by this slot.
    pub direction: Particle,
    /// The weight the particle carried when it was resampled into this slot.
    /// The next cycle's memory blend reads it as the slot's previous weight.
    pub weight: f64,
}

impl ParticleRecord {
    pub fn null() -> Self {
        Self {
            direction: Particle::zeros(),
            weight: 1.0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.direction.norm() <= NULL_PARTICLE_NORM
    }
}

/// A candidate of the augmented set, only alive for one update cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedParticle {
    pub direction: Particle,
    pub weight: f64,
}

impl WeightedParticle {
    pub fn new(direction: Particle, weight: f64) -> Self {
        Self { direction, weight }
    }
}

/// The four task-space signals the filter consumes every control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CycleInput {
    /// Commanded motion; only its direction matters.
    pub motion_control: Vector3<f64>,
    /// Commanded force; only its direction matters.
    pub force_control: Vector3<f64>,
    /// Sensed end-effector velocity (length / time).
    pub velocity_measured: Vector3<f64>,
    /// Sensed contact force (force units).
    pub force_measured: Vector3<f64>,
}

impl CycleInput {
    pub fn new(
        motion_control: Vector3<f64>,
        force_control: Vector3<f64>,
        velocity_measured: Vector3<f64>,
        force_measured: Vector3<f64>,
    ) -> Self {
        Self {
            motion_control,
            force_control,
            velocity_measured,
            force_measured,
        }
    }
}

/// Returns `v / |v|` when `|v| > deadband`, and exactly zero otherwise.
pub fn normalize_or_zero(v: &Vector3<f64>, deadband: f64) -> Vector3<f64> {
    let norm = v.norm();
    if norm > deadband {
        v / norm
    } else {
        Vector3::zeros()
    }
}
