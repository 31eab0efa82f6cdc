// haptos_core/src/estimation/resampling.rs

use crate::error::FilterError;
use crate::types::{ParticleRecord, WeightedParticle};
use crate::utils::sampling::Sampler;

/// Offset added to a candidate's mean distance before it becomes a weight multiplier.
const PROXIMITY_PENALTY_FLOOR: f64 = 0.5;

/// The resampling path that produced a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampler {
    LowVariance,
    ProximityPenalized,
    /// Equal weights, after every candidate scored zero.
    UniformFallback,
}

/// Multipliers in `[0.5, 1]` that shrink the weight of candidates sitting in a
/// tight cluster: `min(1, 0.5 + mean_j |c_i - c_j|)`.
pub fn proximity_penalties(candidates: &[WeightedParticle]) -> Vec<f64> {
    let m = candidates.len() as f64;
    candidates
        .iter()
        .map(|ci| {
            let mean_distance = candidates
                .iter()
                .map(|cj| (ci.direction - cj.direction).norm())
                .sum::<f64>()
                / m;
            (PROXIMITY_PENALTY_FLOOR + mean_distance).min(1.0)
        })
        .collect()
}

/// Running sum of the weights divided by the total, so the last entry is 1.
pub fn normalized_cumulative(
    weights: impl IntoIterator<Item = f64>,
) -> Result<Vec<f64>, FilterError> {
    let mut total = 0.0;
    let mut cumulative: Vec<f64> = weights
        .into_iter()
        .map(|w| {
            total += w;
            total
        })
        .collect();

    if !(total.is_finite() && total > 0.0) {
        return Err(FilterError::DegenerateWeights);
    }
    for c in cumulative.iter_mut() {
        *c /= total;
    }
    Ok(cumulative)
}

/// Low-variance systematic resampling into `slots`.
///
/// One uniform offset in `[0, 1/N)`, then `N` evenly spaced pointers walk the
/// cumulative weights in a single pass. `slots` keeps its length; every slot
/// receives a copy (direction and weight) of the selected candidate.
pub fn resample_low_variance(
    candidates: &[WeightedParticle],
    slots: &mut [ParticleRecord],
    sampler: &mut Sampler,
) -> Result<(), FilterError> {
    let cumulative = normalized_cumulative(candidates.iter().map(|c| c.weight))?;
    systematic_select(candidates, &cumulative, slots, sampler);
    Ok(())
}

/// Same as [`resample_low_variance`] after multiplying every weight by its
/// [`proximity_penalties`] factor. Keeps spread when the contact spans more
/// than a plane.
pub fn resample_low_variance_with_proximity_penalty(
    candidates: &[WeightedParticle],
    slots: &mut [ParticleRecord],
    sampler: &mut Sampler,
) -> Result<(), FilterError> {
    let penalized: Vec<WeightedParticle> = candidates
        .iter()
        .zip(proximity_penalties(candidates))
        .map(|(c, p)| WeightedParticle::new(c.direction, c.weight * p))
        .collect();
    resample_low_variance(&penalized, slots, sampler)
}

/// Resampling under equal weights. Used when the measured weights collapse.
pub fn resample_uniform(
    candidates: &[WeightedParticle],
    slots: &mut [ParticleRecord],
    sampler: &mut Sampler,
) {
    if candidates.is_empty() {
        return;
    }
    let m = candidates.len() as f64;
    let cumulative: Vec<f64> = (1..=candidates.len()).map(|k| k as f64 / m).collect();
    systematic_select(candidates, &cumulative, slots, sampler);
}

fn systematic_select(
    candidates: &[WeightedParticle],
    cumulative: &[f64],
    slots: &mut [ParticleRecord],
    sampler: &mut Sampler,
) {
    if slots.is_empty() || cumulative.is_empty() {
        return;
    }
    let n_inv = 1.0 / slots.len() as f64;
    let last = cumulative.len() - 1;
    let mut r = sampler.uniform(0.0, n_inv);
    let mut k = 0;

    for slot in slots.iter_mut() {
        while k < last && cumulative[k] < r {
            k += 1;
        }
        let chosen = &candidates[k];
        slot.direction = chosen.direction;
        slot.weight = chosen.weight;
        r += n_inv;
    }
}
