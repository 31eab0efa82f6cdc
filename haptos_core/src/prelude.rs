// haptos_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::ContactEstimator;
pub use crate::models::weighting::WeightModel;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::FilterConfig;
pub use crate::error::FilterError;
pub use crate::estimation::pca::PrincipalAxes;
pub use crate::estimation::resampling::Resampler;
pub use crate::models::policy::CyclePolicy;
pub use crate::models::weighting::{Band, WeightingProfile};
pub use crate::types::{CycleInput, Particle, ParticleRecord, WeightedParticle};

// --- Estimation Algorithms ---
pub use crate::estimation::filters::ForceSpaceParticleFilter;
pub use crate::models::weighting::{weight_force, weight_velocity, Hyperbolic, PiecewiseLinear};
