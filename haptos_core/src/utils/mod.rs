// haptos_core/src/utils/mod.rs

pub mod sampling;
