// haptos_core/src/estimation/filters/force_space.rs

use nalgebra::Vector3;
use rand_distr::Normal;
use tracing::{debug, warn};

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::estimation::augmentation::{augment, Augmented};
use crate::estimation::pca::{origin_anchor_count, principal_axes, PrincipalAxes};
use crate::estimation::resampling::{
    resample_low_variance, resample_low_variance_with_proximity_penalty, resample_uniform,
    Resampler,
};
use crate::estimation::ContactEstimator;
use crate::models::policy::CyclePolicy;
use crate::models::weighting::WeightModel;
use crate::types::{CycleInput, Particle, ParticleRecord};
use crate::utils::sampling::{scatter_distribution, Sampler};

/// A particle filter over contact-force directions.
///
/// The population is a fixed set of `N` records, each holding a hypothesized
/// contact direction (unit vector) or the null hypothesis (zero). Every
/// [`update`](Self::update) augments the population with a null candidate and
/// with particles injected along the commanded axes, diffuses and weights all
/// candidates, then draws the next population by low-variance resampling.
#[derive(Debug, Clone)]
pub struct ForceSpaceParticleFilter {
    records: Vec<ParticleRecord>,
    config: FilterConfig,
    weight_model: Box<dyn WeightModel>,
    /// Per-axis diffusion noise, rebuilt whenever the config changes.
    scatter: Normal<f64>,
    sampler: Sampler,
    last_injected: usize,
    last_resampler: Option<Resampler>,
}

impl ForceSpaceParticleFilter {
    /// A filter with the default configuration, seeded from OS entropy.
    pub fn new(n_particles: usize) -> Result<Self, FilterError> {
        Self::with_config(n_particles, FilterConfig::default(), None)
    }

    /// A filter with the default configuration and a fixed seed.
    pub fn with_seed(n_particles: usize, seed: u64) -> Result<Self, FilterError> {
        Self::with_config(n_particles, FilterConfig::default(), Some(seed))
    }

    /// Creates a filter of `n_particles` null particles, each with weight 1.
    pub fn with_config(
        n_particles: usize,
        config: FilterConfig,
        seed: Option<u64>,
    ) -> Result<Self, FilterError> {
        if n_particles == 0 {
            return Err(FilterError::EmptyPopulation);
        }
        config.validate()?;
        let scatter = scatter_distribution(config.scatter_mean, config.scatter_std)?;
        let sampler = match seed {
            Some(seed) => Sampler::seeded(seed),
            None => Sampler::from_entropy(),
        };

        Ok(Self {
            records: vec![ParticleRecord::null(); n_particles],
            weight_model: config.weighting.build(),
            config,
            scatter,
            sampler,
            last_injected: 0,
            last_resampler: None,
        })
    }

    /// Runs one filter cycle on the four task-space signals.
    pub fn update(
        &mut self,
        motion_control: Vector3<f64>,
        force_control: Vector3<f64>,
        velocity_measured: Vector3<f64>,
        force_measured: Vector3<f64>,
    ) {
        let input = CycleInput::new(
            motion_control,
            force_control,
            velocity_measured,
            force_measured,
        );
        self.step(&input);
    }

    fn step(&mut self, input: &CycleInput) {
        let policy = self.cycle_policy();

        // --- 1. Motion update and weighting ---
        let Augmented {
            candidates,
            injected,
        } = augment(
            &self.records,
            input,
            &self.config,
            &policy,
            self.weight_model.as_ref(),
            &self.scatter,
            &mut self.sampler,
        );
        self.last_injected = injected;

        // --- 2. Resampling ---
        let resampler = if policy.proximity_penalty {
            Resampler::ProximityPenalized
        } else {
            Resampler::LowVariance
        };
        let (slots, sampler) = (&mut self.records, &mut self.sampler);
        let resampled = match resampler {
            Resampler::ProximityPenalized => {
                resample_low_variance_with_proximity_penalty(&candidates, slots, sampler)
            }
            _ => resample_low_variance(&candidates, slots, sampler),
        };

        let resampler = match resampled {
            Ok(()) => resampler,
            Err(e) => {
                // No candidate is supported by the measurements, keep the candidate set
                // but forget what the weights said.
                warn!(
                    candidates = candidates.len(),
                    error = %e,
                    "resampling failed, falling back to uniform weights"
                );
                resample_uniform(&candidates, slots, sampler);
                Resampler::UniformFallback
            }
        };
        self.last_resampler = Some(resampler);

        debug!(
            candidates = candidates.len(),
            injected,
            resampler = ?resampler,
            null_particles = self.null_count(),
            "force-space filter cycle complete"
        );
    }

    /// Principal axes of the population, padded with the configured origin anchors.
    pub fn principal_axes(&self) -> PrincipalAxes {
        let anchors = origin_anchor_count(self.records.len(), self.config.pca_origin_padding);
        principal_axes(self.records.iter().map(|r| r.direction), anchors)
    }

    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    pub fn particles(&self) -> Vec<Particle> {
        self.records.iter().map(|r| r.direction).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records currently holding the null hypothesis.
    pub fn null_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_null()).count()
    }

    /// Number of particles injected during the most recent update.
    pub fn last_injected(&self) -> usize {
        self.last_injected
    }

    /// Resampling path taken by the most recent update, `None` before the first.
    pub fn last_resampler(&self) -> Option<Resampler> {
        self.last_resampler
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        CyclePolicy::for_config(&self.config)
    }

    /// Replaces the whole configuration. The current one is kept if `config` is invalid.
    pub fn set_config(&mut self, config: FilterConfig) -> Result<(), FilterError> {
        config.validate()?;
        self.scatter = scatter_distribution(config.scatter_mean, config.scatter_std)?;
        if config.weighting != self.config.weighting {
            self.weight_model = config.weighting.build();
        }
        self.config = config;
        Ok(())
    }

    pub fn set_force_space_dimension(&mut self, dimension: usize) {
        self.config.force_space_dimension = dimension;
    }
}

impl ContactEstimator for ForceSpaceParticleFilter {
    fn process(&mut self, input: &CycleInput) {
        self.step(input);
    }

    fn population(&self) -> &[ParticleRecord] {
        self.records()
    }

    fn principal_axes(&self) -> PrincipalAxes {
        ForceSpaceParticleFilter::principal_axes(self)
    }

    fn set_force_space_dimension(&mut self, dimension: usize) {
        ForceSpaceParticleFilter::set_force_space_dimension(self, dimension);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weighting::{Band, WeightingProfile};

    use approx::assert_abs_diff_eq;

    const X: [f64; 3] = [1.0, 0.0, 0.0];
    const Y: [f64; 3] = [0.0, 1.0, 0.0];
    const Z: [f64; 3] = [0.0, 0.0, 1.0];
    const ZERO: [f64; 3] = [0.0; 3];

    /// One cycle with no measured velocity.
    fn press(filter: &mut ForceSpaceParticleFilter, m: [f64; 3], c: [f64; 3], f: [f64; 3]) {
        filter.update(m.into(), c.into(), Vector3::zeros(), f.into());
    }

    fn idle(filter: &mut ForceSpaceParticleFilter) {
        press(filter, ZERO, ZERO, ZERO);
    }

    fn assert_invariants(filter: &ForceSpaceParticleFilter, n: usize) {
        assert_eq!(filter.len(), n);
        for r in filter.records() {
            let norm = r.direction.norm();
            let unit = (norm - 1.0).abs() < 1e-9;
            assert!(norm == 0.0 || unit, "particle norm {norm}");
            assert!(r.weight >= 0.0);
        }
    }

    #[test]
    fn construction_starts_from_null_population() {
        let filter = ForceSpaceParticleFilter::with_seed(16, 0).unwrap();
        assert_eq!(filter.len(), 16);
        assert_eq!(filter.null_count(), 16);
        assert!(filter.records().iter().all(|r| r.weight == 1.0));
        assert_eq!(filter.last_resampler(), None);
    }

    #[test]
    fn construction_rejects_bad_inputs() {
        let err = ForceSpaceParticleFilter::with_seed(0, 0).unwrap_err();
        assert_eq!(err, FilterError::EmptyPopulation);
        let config = FilterConfig {
            force_band: Band::new(5.0, 0.0),
            ..Default::default()
        };
        let result = ForceSpaceParticleFilter::with_config(10, config, Some(0));
        assert!(matches!(result, Err(FilterError::InvalidBand { .. })));
    }

    #[test]
    fn converges_to_contact_direction() {
        let mut filter = ForceSpaceParticleFilter::with_seed(100, 17).unwrap();
        for _ in 0..50 {
            press(&mut filter, X, X, [4.0, 0.0, 0.0]);
            assert_invariants(&filter, 100);
        }
        assert_eq!(filter.last_resampler(), Some(Resampler::LowVariance));

        let axes = filter.principal_axes();
        let axis = axes.dominant_axis();
        let cos = axis.dot(&Vector3::x()).abs();
        let limit = 5f64.to_radians().cos();
        assert!(cos >= limit, "dominant axis {axis:?}");
        assert!(axes.eigenvalues[0] >= 3.0 * axes.eigenvalues[1]);
        assert!(axes.eigenvalues[0] >= 3.0 * axes.eigenvalues[2]);
        assert!(filter.null_count() < 50);
    }

    #[test]
    fn stays_null_without_contact() {
        let mut filter = ForceSpaceParticleFilter::with_seed(100, 3).unwrap();
        for _ in 0..50 {
            idle(&mut filter);
            assert_invariants(&filter, 100);
        }
        let nulls = filter.null_count();
        assert!(nulls > 90, "only {nulls} null particles");
    }

    #[test]
    fn releases_contact_when_force_vanishes() {
        let mut filter = ForceSpaceParticleFilter::with_seed(100, 8).unwrap();
        for _ in 0..30 {
            press(&mut filter, X, X, [4.0, 0.0, 0.0]);
        }
        assert!(filter.null_count() < 20);
        for _ in 0..30 {
            idle(&mut filter);
        }
        assert!(filter.null_count() > 90);
    }

    #[test]
    fn pca_has_no_side_effects() {
        let mut filter = ForceSpaceParticleFilter::with_seed(60, 21).unwrap();
        for _ in 0..10 {
            press(&mut filter, Y, Y, [0.0, 6.0, 0.0]);
        }
        let before = filter.records().to_vec();
        let first = filter.principal_axes();
        let second = filter.principal_axes();
        assert_eq!(first, second);
        assert_eq!(filter.records(), before.as_slice());
    }

    #[test]
    fn full_injection_fills_candidate_set() {
        let mut filter = ForceSpaceParticleFilter::with_seed(40, 5).unwrap();
        press(&mut filter, X, Z, [12.0, 0.0, 0.0]);
        assert_eq!(filter.last_injected(), 40);
        press(&mut filter, X, Z, [1.0, 0.0, 0.0]);
        assert_eq!(filter.last_injected(), 0);
    }

    #[test]
    fn same_seed_reproduces_population() {
        let (z, drift) = (Vector3::z(), Vector3::new(0.0, 0.01, 0.0));
        let run = |seed| {
            let mut filter = ForceSpaceParticleFilter::with_seed(50, seed).unwrap();
            for _ in 0..20 {
                filter.update(z, z, drift, 5.0 * z);
            }
            filter.particles()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn memory_smooths_transient_loss_of_contact() {
        let config = FilterConfig {
            memory_coefficient: 0.9,
            ..Default::default()
        };
        let mut filter = ForceSpaceParticleFilter::with_config(100, config, Some(12)).unwrap();
        for _ in 0..30 {
            press(&mut filter, X, X, [4.0, 0.0, 0.0]);
        }
        let contact_before = 100 - filter.null_count();
        // One cycle without force: contact slots keep most of their remembered weight.
        idle(&mut filter);
        assert!(100 - filter.null_count() > contact_before / 2);
    }

    #[test]
    fn spatial_hint_runs_penalized_resampling() {
        let mut filter = ForceSpaceParticleFilter::with_seed(60, 4).unwrap();
        filter.set_force_space_dimension(3);
        assert!(filter.cycle_policy().proximity_penalty);
        for _ in 0..20 {
            press(&mut filter, X, Y, [20.0, 20.0, 0.0]);
            assert_invariants(&filter, 60);
        }
        let used = filter.last_resampler();
        assert_eq!(used, Some(Resampler::ProximityPenalized));
    }

    #[test]
    fn degenerate_weights_fall_back_to_uniform() {
        // A huge force opposite to every hypothesis: the null candidate and all
        // contact candidates score zero.
        let mut filter = ForceSpaceParticleFilter::with_seed(30, 6).unwrap();
        for _ in 0..10 {
            press(&mut filter, X, X, [12.0, 0.0, 0.0]);
        }
        assert_eq!(filter.last_resampler(), Some(Resampler::LowVariance));

        press(&mut filter, ZERO, ZERO, [-50.0, 0.0, 0.0]);
        let used = filter.last_resampler();
        assert_eq!(used, Some(Resampler::UniformFallback));
        // Every slot carries the zero weight of the candidate it was copied from.
        assert!(filter.records().iter().all(|r| r.weight == 0.0));
        assert_invariants(&filter, 30);
    }

    #[test]
    fn set_config_rejects_and_keeps_previous() {
        let mut filter = ForceSpaceParticleFilter::with_seed(10, 0).unwrap();
        let bad = FilterConfig {
            memory_coefficient: -0.1,
            ..Default::default()
        };
        assert!(filter.set_config(bad).is_err());
        assert_eq!(filter.config(), &FilterConfig::default());

        let good = FilterConfig {
            weighting: WeightingProfile::Hyperbolic,
            scatter_std: 0.01,
            ..Default::default()
        };
        filter.set_config(good.clone()).unwrap();
        assert_eq!(filter.config(), &good);
    }

    #[test]
    fn trait_object_drives_the_same_filter() {
        let filter = ForceSpaceParticleFilter::with_seed(20, 1).unwrap();
        let mut estimator: Box<dyn ContactEstimator> = Box::new(filter);
        let force = Vector3::new(4.0, 0.0, 0.0);
        let input = CycleInput::new(Vector3::x(), Vector3::x(), Vector3::zeros(), force);
        for _ in 0..10 {
            estimator.process(&input);
        }
        assert_eq!(estimator.population().len(), 20);
        let axes = estimator.principal_axes();
        assert_abs_diff_eq!(axes.dominant_axis().norm(), 1.0, epsilon = 1e-9);
    }
}
