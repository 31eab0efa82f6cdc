// haptos_core/src/estimation/mod.rs

use crate::estimation::pca::PrincipalAxes;
use crate::types::{CycleInput, ParticleRecord};

/// The contract for any algorithm that performs the "contact estimator" role.
/// Its sole responsibility is to track the direction(s) along which the
/// end-effector is constrained by its environment.
pub trait ContactEstimator: Send + Sync {
    /// Consumes the signals of one control cycle.
    fn process(&mut self, input: &CycleInput);

    /// The current belief, one record per particle.
    fn population(&self) -> &[ParticleRecord];

    /// Principal-axis summary of the current belief. Must not change any state.
    fn principal_axes(&self) -> PrincipalAxes;

    /// Tells the estimator how many independent directions the contact is
    /// believed to span.
    fn set_force_space_dimension(&mut self, dimension: usize);
}

pub mod augmentation;
pub mod filters;
pub mod pca;
pub mod resampling;
