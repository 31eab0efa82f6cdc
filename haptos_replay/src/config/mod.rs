// haptos_replay/src/config/mod.rs

//! This module handles loading and validating scenario files from disk,
//! including discovery of every scenario under a directory.

mod catalog;

use std::path::Path;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use haptos_core::config::FilterConfig;
use nalgebra::Vector3;
use serde::Deserialize;
use tracing::info;

use crate::error::ReplayError;

pub use catalog::discover_scenarios;

// =========================================================================
// == Top-Level Scenario Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub filter: FilterSection,

    #[serde(default)]
    pub noise: NoiseSection,

    // The TOML has `[[phases]]`, which becomes a Vec of Phase structs.
    #[serde(default)]
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Human-readable scenario name, used in logs and reports.
    #[serde(default = "default_name")]
    pub name: String,
    /// Optional seed for the signal-noise generator.
    pub seed: Option<u64>,
    /// Log a principal-axis summary every this many cycles. 0 disables it.
    #[serde(default = "default_report_every")]
    pub report_every: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
            report_every: default_report_every(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    /// Seed of the filter's own sampler. Falls back to `simulation.seed`.
    pub seed: Option<u64>,
    #[serde(default)]
    pub tuning: FilterConfig,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            seed: None,
            tuning: FilterConfig::default(),
        }
    }
}

/// Gaussian noise added to the measured signals before they reach the filter.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NoiseSection {
    #[serde(default)]
    pub velocity_std: f64,
    #[serde(default)]
    pub force_std: f64,
}

/// A constant set of cycle inputs held for `cycles` control cycles.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Phase {
    pub name: String,
    pub cycles: usize,
    #[serde(default)]
    pub motion_control: Vector3<f64>,
    #[serde(default)]
    pub force_control: Vector3<f64>,
    #[serde(default)]
    pub velocity_measured: Vector3<f64>,
    #[serde(default)]
    pub force_measured: Vector3<f64>,
    /// Switches the filter's dimension hint when the phase starts.
    pub force_space_dimension: Option<usize>,
}

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_report_every() -> usize {
    100
}

fn default_particle_count() -> usize {
    100
}

// =========================================================================
// == Loading ==
// =========================================================================

/// Loads a scenario file and validates everything the filter will not.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ReplayError> {
    if !path.exists() {
        return Err(ReplayError::MissingScenario(path.to_path_buf()));
    }
    info!("Loading scenario from: {:?}", path);
    extract_scenario(Figment::new().merge(Toml::file(path)))
}

/// Parses a scenario from an in-memory TOML document.
pub fn parse_scenario(toml: &str) -> Result<ScenarioConfig, ReplayError> {
    extract_scenario(Figment::new().merge(Toml::string(toml)))
}

fn extract_scenario(figment: Figment) -> Result<ScenarioConfig, ReplayError> {
    let scenario: ScenarioConfig = figment.extract()?;
    if scenario.phases.is_empty() {
        return Err(ReplayError::EmptyScenario(scenario.simulation.name));
    }
    for (field, std) in [
        ("velocity_std", scenario.noise.velocity_std),
        ("force_std", scenario.noise.force_std),
    ] {
        if !std.is_finite() || std < 0.0 {
            return Err(ReplayError::InvalidNoise { field, std });
        }
    }
    scenario.filter.tuning.validate()?;
    Ok(scenario)
}
