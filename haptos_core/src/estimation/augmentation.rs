// haptos_core/src/estimation/augmentation.rs

//! Motion update and measurement weighting: turns the current population into
//! a larger, weighted candidate set for the resampler.

use nalgebra::Vector3;
use rand_distr::Normal;

use crate::config::FilterConfig;
use crate::models::policy::CyclePolicy;
use crate::models::weighting::{PiecewiseLinear, WeightModel};
use crate::types::{
    normalize_or_zero, CycleInput, Particle, ParticleRecord, WeightedParticle, NULL_PARTICLE_NORM,
};
use crate::utils::sampling::Sampler;

const MOTION_DEADBAND: f64 = 1e-3;
const FORCE_CONTROL_DEADBAND: f64 = 1e-3;

/// Unit directions of the two commands, zero wherever a command sits inside
/// its deadband.
///
/// The measured velocity and force are only ever projected onto candidates,
/// so they enter weighting as raw vectors and are not normalized here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandDirections {
    pub motion: Vector3<f64>,
    pub force: Vector3<f64>,
}

impl CommandDirections {
    pub fn from_input(input: &CycleInput) -> Self {
        Self {
            motion: normalize_or_zero(&input.motion_control, MOTION_DEADBAND),
            force: normalize_or_zero(&input.force_control, FORCE_CONTROL_DEADBAND),
        }
    }
}

/// The output of one augmentation pass.
#[derive(Debug, Clone)]
pub struct Augmented {
    /// `N` carried-over candidates, then the null candidate, then the injected ones.
    pub candidates: Vec<WeightedParticle>,
    /// How many candidates were injected along the commanded axes.
    pub injected: usize,
}

/// Probability that a new contact is forming along the commanded motion.
///
/// Uses the wide injection bands (force band scaled by the cycle policy) and
/// is clamped to `[0, 1]`.
pub fn injection_probability(
    directions: &CommandDirections,
    input: &CycleInput,
    config: &FilterConfig,
    policy: &CyclePolicy,
) -> f64 {
    let scale = policy.injection_force_scale;
    let force_band = config.injection_force_band.scaled(scale);
    let velocity_band = config.injection_velocity_band;
    let motion = &directions.motion;

    let wf = PiecewiseLinear.force_weight(motion, &input.force_measured, &force_band);
    let wv = PiecewiseLinear.velocity_weight(motion, &input.velocity_measured, &velocity_band);
    (wf * wv).clamp(0.0, 1.0)
}

/// `round(probability * n)`, always within `[0, n]`.
pub fn injection_count(probability: f64, n_particles: usize) -> usize {
    let p = if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((p * n_particles as f64).round() as usize).min(n_particles)
}

/// `count` particles spread evenly along the normalized interpolation from the
/// commanded motion direction to the commanded force direction.
pub fn injected_particles(
    motion: &Vector3<f64>,
    force: &Vector3<f64>,
    count: usize,
) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let alpha = (i as f64 + 0.5) / count as f64;
            let blend = motion * (1.0 - alpha) + force * alpha;
            // A zero interpolant (no command at all) stays on the null hypothesis.
            blend.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
        })
        .collect()
}

/// Adds process noise to a contact candidate and puts it back on the unit sphere.
/// Null candidates are returned unchanged.
pub fn diffuse(particle: &Particle, scatter: &Normal<f64>, sampler: &mut Sampler) -> Particle {
    if particle.norm() <= NULL_PARTICLE_NORM {
        return *particle;
    }
    let perturbed = particle + sampler.gaussian_vector(scatter);
    perturbed.try_normalize(0.0).unwrap_or(*particle)
}

/// Builds and weights the candidate set for one cycle.
pub fn augment(
    records: &[ParticleRecord],
    input: &CycleInput,
    config: &FilterConfig,
    policy: &CyclePolicy,
    model: &dyn WeightModel,
    scatter: &Normal<f64>,
    sampler: &mut Sampler,
) -> Augmented {
    let n = records.len();
    let directions = CommandDirections::from_input(input);

    // --- 1. Seed with the current population plus one null candidate ---
    let probability = injection_probability(&directions, input, config, policy);
    let injected = injection_count(probability, n);

    let mut particles: Vec<Particle> = Vec::with_capacity(n + 1 + injected);
    particles.extend(records.iter().map(|r| r.direction));
    particles.push(Particle::zeros());

    // --- 2. Inject along the commanded axes ---
    let (motion, force) = (&directions.motion, &directions.force);
    particles.extend(injected_particles(motion, force, injected));

    // --- 3. Diffuse and weight ---
    let mu = config.memory_coefficient;
    let candidates = particles
        .iter()
        .enumerate()
        .map(|(i, particle)| {
            let direction = diffuse(particle, scatter, sampler);
            let mut weight = model.weight(
                &direction,
                &input.force_measured,
                &input.velocity_measured,
                &config.force_band,
                &config.velocity_band,
            );
            if i < n {
                weight = weight * (1.0 - mu) + mu * records[i].weight;
            }
            WeightedParticle::new(direction, weight)
        })
        .collect();

    Augmented {
        candidates,
        injected,
    }
}
