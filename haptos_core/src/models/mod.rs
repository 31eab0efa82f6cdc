// haptos_core/src/models/mod.rs

pub mod policy;
pub mod weighting;
