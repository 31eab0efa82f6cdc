// haptos_core/src/estimation/filters/mod.rs

pub mod force_space;

pub use force_space::ForceSpaceParticleFilter;
