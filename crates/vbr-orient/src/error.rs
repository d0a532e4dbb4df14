use std::fmt;

use serde::Serialize;

/// Reasons a point cloud cannot yield well-defined principal axes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum DegenerateInputError {
    /// Fewer points than needed for a 3x3 covariance estimate
    #[error("Expected at least 3 points, got {count}")]
    TooFewPoints {
        /// Number of points supplied.
        count: usize,
    },

    /// Collinear or coincident points
    #[error("Covariance rank {rank} is below 2, the points are collinear or coincident")]
    RankDeficient {
        /// Number of eigenvalues above the degeneracy threshold.
        rank: usize,
    },

    /// At least one coordinate is NaN or infinite
    #[error("Point cloud contains non-finite coordinates")]
    NonFiniteCoordinates,
}

/// Two adjacent principal variances are too close to tell their axes apart.
///
/// The estimate is still returned, but which of the two axes is reported first,
/// and therefore the angles derived from them, depends on numerical noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericalInstabilityWarning {
    /// Index of the axis with the larger variance.
    pub leading_axis: usize,
    /// Index of the axis with the smaller variance.
    pub trailing_axis: usize,
    /// Variance gap divided by the largest variance.
    pub relative_gap: f64,
}

impl fmt::Display for NumericalInstabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal axes {} and {} have nearly equal variance (relative gap {:.3e})",
            self.leading_axis, self.trailing_axis, self.relative_gap
        )
    }
}
