// haptos_replay/src/replay/mod.rs

//! Drives a contact estimator through the phases of a scenario and records
//! what it believed at the end of each phase.

pub mod noise;

use std::fmt;

use haptos_core::prelude::{ContactEstimator, CycleInput, ForceSpaceParticleFilter};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Phase, ScenarioConfig};
use crate::error::ReplayError;
use noise::{ReplayRng, SensorNoise};

/// The estimator's belief at the end of one phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub name: String,
    pub cycles: usize,
    /// Share of particles holding the null hypothesis.
    pub null_fraction: f64,
    pub dominance_ratio: f64,
    pub dominant_axis: Vector3<f64>,
    pub eigenvalues: Vector3<f64>,
}

impl PhaseReport {
    fn capture(phase: &Phase, estimator: &dyn ContactEstimator) -> Self {
        let population = estimator.population();
        let nulls = population.iter().filter(|r| r.is_null()).count();
        let axes = estimator.principal_axes();
        Self {
            name: phase.name.clone(),
            cycles: phase.cycles,
            null_fraction: nulls as f64 / population.len().max(1) as f64,
            dominance_ratio: axes.dominance_ratio(),
            dominant_axis: axes.dominant_axis(),
            eigenvalues: axes.eigenvalues,
        }
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, null) = (&self.name, self.null_fraction);
        let axis = &self.dominant_axis;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        write!(f, "{name:<16} null {null:>5.2}")?;
        write!(f, "  axis [{x:>6.3}, {y:>6.3}, {z:>6.3}]")?;
        write!(f, "  ratio {:>8.1}", self.dominance_ratio)
    }
}

/// Everything one scenario replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub scenario: String,
    pub particle_count: usize,
    pub phases: Vec<PhaseReport>,
}

impl ReplayReport {
    pub fn to_toml(&self) -> Result<String, ReplayError> {
        Ok(toml::to_string(self)?)
    }
}

/// Replays `scenario` from a fresh filter. `seed_override` replaces every seed
/// in the file.
pub fn run_scenario(
    scenario: &ScenarioConfig,
    seed_override: Option<u64>,
) -> Result<ReplayReport, ReplayError> {
    let filter_seed = seed_override
        .or(scenario.filter.seed)
        .or(scenario.simulation.seed);
    let noise_seed = seed_override.or(scenario.simulation.seed);

    let filter = ForceSpaceParticleFilter::with_config(
        scenario.filter.particle_count,
        scenario.filter.tuning.clone(),
        filter_seed,
    )?;
    let mut estimator: Box<dyn ContactEstimator> = Box::new(filter);
    let noise = SensorNoise::from_config(&scenario.noise)?;
    let mut rng = ReplayRng::new(noise_seed);
    let report_every = scenario.simulation.report_every;

    info!(
        scenario = %scenario.simulation.name,
        particles = scenario.filter.particle_count,
        phases = scenario.phases.len(),
        "replaying scenario"
    );

    let mut phases = Vec::with_capacity(scenario.phases.len());
    for phase in &scenario.phases {
        if let Some(dimension) = phase.force_space_dimension {
            estimator.set_force_space_dimension(dimension);
        }
        info!(phase = %phase.name, cycles = phase.cycles, "phase started");

        for cycle in 1..=phase.cycles {
            let input = CycleInput::new(
                phase.motion_control,
                phase.force_control,
                noise.corrupt_velocity(&phase.velocity_measured, &mut rng),
                noise.corrupt_force(&phase.force_measured, &mut rng),
            );
            estimator.process(&input);

            if report_every > 0 && cycle % report_every == 0 {
                let axes = estimator.principal_axes();
                debug!(
                    phase = %phase.name,
                    cycle,
                    axis = ?axes.dominant_axis().as_slice(),
                    eigenvalues = ?axes.eigenvalues.as_slice(),
                    "principal axes"
                );
            }
        }

        let report = PhaseReport::capture(phase, estimator.as_ref());
        info!(
            phase = %report.name,
            null_fraction = report.null_fraction,
            axis = ?report.dominant_axis.as_slice(),
            ratio = report.dominance_ratio,
            "phase finished"
        );
        phases.push(report);
    }

    Ok(ReplayReport {
        scenario: scenario.simulation.name.clone(),
        particle_count: scenario.filter.particle_count,
        phases,
    })
}
