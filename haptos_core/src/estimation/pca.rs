// haptos_core/src/estimation/pca.rs

use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::Particle;

/// Principal axes of a particle population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalAxes {
    /// Eigenvalues of the centered second-moment matrix, largest first.
    pub eigenvalues: Vector3<f64>,
    /// Orthonormal eigenvectors; column `i` belongs to `eigenvalues[i]`.
    pub eigenvectors: Matrix3<f64>,
}

impl PrincipalAxes {
    /// The axis the population spreads along the most.
    pub fn dominant_axis(&self) -> Vector3<f64> {
        self.eigenvectors.column(0).into_owned()
    }

    /// How strongly the dominant axis stands out over the second one.
    pub fn dominance_ratio(&self) -> f64 {
        self.eigenvalues[0] / self.eigenvalues[1].max(f64::EPSILON)
    }
}

/// Number of zero points padded into the analysis: `floor((1 + padding) * n) - n`.
pub fn origin_anchor_count(n_particles: usize, padding: f64) -> usize {
    let padded = ((1.0 + padding) * n_particles as f64).floor() as usize;
    padded.saturating_sub(n_particles)
}

/// PCA of `points` joined by `anchors` extra points at the origin.
///
/// The anchors shift the mean toward zero, so a population collapsed onto one
/// contact direction still yields that direction as its dominant axis.
pub fn principal_axes<I>(points: I, anchors: usize) -> PrincipalAxes
where
    I: Iterator<Item = Particle> + Clone,
{
    let count = points.clone().count() + anchors;
    let mean = if count == 0 {
        Vector3::zeros()
    } else {
        points.clone().fold(Vector3::zeros(), |acc, p| acc + p) / count as f64
    };

    let mut second_moment = points.fold(Matrix3::zeros(), |acc, p| {
        let centered = p - mean;
        acc + centered * centered.transpose()
    });
    second_moment += mean * mean.transpose() * anchors as f64;

    let eig = SymmetricEigen::new(second_moment);

    // Sort largest first.
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

    let eigenvalues = Vector3::new(
        eig.eigenvalues[order[0]],
        eig.eigenvalues[order[1]],
        eig.eigenvalues[order[2]],
    );
    let eigenvectors = Matrix3::from_columns(&[
        eig.eigenvectors.column(order[0]).into_owned(),
        eig.eigenvectors.column(order[1]).into_owned(),
        eig.eigenvectors.column(order[2]).into_owned(),
    ]);

    PrincipalAxes {
        eigenvalues,
        eigenvectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn anchor_count_matches_padding() {
        assert_eq!(origin_anchor_count(100, 0.5), 50);
        assert_eq!(origin_anchor_count(7, 0.5), 3);
        assert_eq!(origin_anchor_count(100, 0.0), 0);
    }

    #[test]
    fn line_spread_gives_line_axis() {
        let points = vec![Vector3::y(), -Vector3::y(), Vector3::y(), -Vector3::y()];
        let axes = principal_axes(points.into_iter(), 0);
        assert_abs_diff_eq!(axes.eigenvalues[0], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(axes.eigenvalues[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(axes.dominant_axis().y.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn eigenvalues_are_sorted_descending() {
        let points = vec![
            Vector3::new(3.0, 0.0, 0.0),
            Vector3::new(-3.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(0.0, 0.0, -2.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
        ];
        let axes = principal_axes(points.into_iter(), 0);
        assert!(axes.eigenvalues[0] >= axes.eigenvalues[1]);
        assert!(axes.eigenvalues[1] >= axes.eigenvalues[2]);
        assert_abs_diff_eq!(axes.eigenvectors.column(0).x.abs(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(axes.eigenvectors.column(1).z.abs(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(axes.eigenvectors.column(2).y.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn anchors_recover_collapsed_direction() {
        let dir = Vector3::new(1.0, 1.0, 0.0).normalize();
        let points = vec![dir; 20];
        let plain = principal_axes(points.iter().copied(), 0);
        assert_abs_diff_eq!(plain.eigenvalues.norm(), 0.0, epsilon = 1e-12);

        let anchored = principal_axes(points.iter().copied(), origin_anchor_count(20, 0.5));
        let along = anchored.dominant_axis().dot(&dir).abs();
        assert_abs_diff_eq!(along, 1.0, epsilon = 1e-9);
        // 30 points, 20 at `dir`: 30 * (2/3) * (1/3).
        assert_abs_diff_eq!(anchored.eigenvalues[0], 20.0 / 3.0, epsilon = 1e-9);
    }
}
