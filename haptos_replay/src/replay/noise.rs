// haptos_replay/src/replay/noise.rs

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::config::NoiseSection;
use crate::error::ReplayError;

/// ChaCha stream reserved for signal noise, so a filter seeded with the same
/// value draws from a different sequence.
const NOISE_STREAM: u64 = 1;

/// The deterministic pseudo-random generator for the signal noise of one replay.
pub struct ReplayRng(pub ChaCha8Rng);

impl ReplayRng {
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        rng.set_stream(NOISE_STREAM);
        Self(rng)
    }
}

/// Additive Gaussian noise on the measured velocity and force.
#[derive(Debug, Clone)]
pub struct SensorNoise {
    velocity_noise: Normal<f64>,
    force_noise: Normal<f64>,
}

impl SensorNoise {
    pub fn from_config(config: &NoiseSection) -> Result<Self, ReplayError> {
        Ok(Self {
            velocity_noise: zero_mean("velocity_std", config.velocity_std)?,
            force_noise: zero_mean("force_std", config.force_std)?,
        })
    }

    pub fn corrupt_velocity(&self, velocity: &Vector3<f64>, rng: &mut ReplayRng) -> Vector3<f64> {
        velocity + sample_vector(&self.velocity_noise, rng)
    }

    pub fn corrupt_force(&self, force: &Vector3<f64>, rng: &mut ReplayRng) -> Vector3<f64> {
        force + sample_vector(&self.force_noise, rng)
    }
}

fn zero_mean(field: &'static str, std: f64) -> Result<Normal<f64>, ReplayError> {
    Normal::new(0.0, std).map_err(|_| ReplayError::InvalidNoise { field, std })
}

fn sample_vector(distribution: &Normal<f64>, rng: &mut ReplayRng) -> Vector3<f64> {
    Vector3::new(
        distribution.sample(&mut rng.0),
        distribution.sample(&mut rng.0),
        distribution.sample(&mut rng.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_std_leaves_signals_untouched() {
        let noise = SensorNoise::from_config(&NoiseSection::default()).unwrap();
        let mut rng = ReplayRng::new(Some(1));
        let f = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(noise.corrupt_force(&f, &mut rng), f);
        assert_eq!(noise.corrupt_velocity(&f, &mut rng), f);
    }

    #[test]
    fn noise_is_reproducible() {
        let config = NoiseSection {
            velocity_std: 0.01,
            force_std: 0.5,
        };
        let noise = SensorNoise::from_config(&config).unwrap();
        let mut a = ReplayRng::new(Some(5));
        let mut b = ReplayRng::new(Some(5));
        let f = Vector3::x();
        let first = noise.corrupt_force(&f, &mut a);
        assert_eq!(first, noise.corrupt_force(&f, &mut b));
        assert_ne!(noise.corrupt_force(&f, &mut a), f);
    }

    #[test]
    fn negative_std_is_rejected() {
        let config = NoiseSection {
            velocity_std: 0.0,
            force_std: -1.0,
        };
        let err = SensorNoise::from_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidNoise { field, .. } if field == "force_std"));
    }
}
