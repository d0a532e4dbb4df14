//! Principal axis extraction and the pitch, roll and yaw derived from it.
//!
//! The covariance of the centered points is diagonalised; its eigenvectors,
//! ordered by descending eigenvalue, are the principal axes. Each angle reads
//! two components of one axis:
//!
//! ```text
//! pitch = atan2(axis₀.z, axis₀.y)   YZ plane, direction of maximum spread
//! roll  = atan2(axis₁.z, axis₁.x)   XZ plane, intermediate direction
//! yaw   = atan2(axis₂.y, axis₂.x)   XY plane, direction of minimum spread
//! ```

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use vbr_3d::pointcloud::PointCloud;
use vbr_linalg::eigen::symmetric_eigen3;

use crate::angles::OrientationAngles;
use crate::error::{DegenerateInputError, NumericalInstabilityWarning};

/// Minimum number of points for a covariance estimate.
pub const MIN_POINTS: usize = 3;

/// (numerator, denominator) component indices of the angle read from each axis.
const ANGLE_COMPONENTS: [(usize, usize); 3] = [(2, 1), (2, 0), (1, 0)];

/// Components below this magnitude are treated as zero when fixing axis signs.
const SIGN_EPSILON: f64 = 1e-12;

/// How the sign of each eigenvector is chosen before reading its angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSignConvention {
    /// Keep whatever sign the eigensolver produced.
    Solver,
    /// Flip each axis so the numerator component of its angle is non-negative,
    /// or, when that component is zero, so the denominator component is.
    #[default]
    NonNegativeNumerator,
}

/// Parameters of the principal axis estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Eigenvalues at or below this fraction of the largest one do not count toward the rank.
    pub degeneracy_tolerance: f64,
    /// Adjacent eigenvalues whose gap, relative to the largest one, is below this are flagged.
    pub instability_tolerance: f64,
    /// Eigenvector sign convention.
    pub sign_convention: AxisSignConvention,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            degeneracy_tolerance: 1e-10,
            instability_tolerance: 1e-3,
            sign_convention: AxisSignConvention::default(),
        }
    }
}

/// Unit principal axes ordered by descending variance.
///
/// The axes are pairwise orthogonal; their handedness is not constrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PrincipalAxes([[f64; 3]; 3]);

impl PrincipalAxes {
    /// Get the `index`-th axis, 0 being the direction of maximum spread.
    ///
    /// PRECONDITION: `index < 3`.
    #[inline]
    pub fn axis(&self, index: usize) -> [f64; 3] {
        self.0[index]
    }

    /// Direction of maximum spread.
    pub fn major(&self) -> [f64; 3] {
        self.0[0]
    }

    /// Direction of intermediate spread.
    pub fn intermediate(&self) -> [f64; 3] {
        self.0[1]
    }

    /// Direction of minimum spread, the normal of a roughly planar structure.
    pub fn minor(&self) -> [f64; 3] {
        self.0[2]
    }

    /// The three axes as rows.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        self.0
    }
}

/// Everything the estimator derives from one point cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationEstimate {
    angles: OrientationAngles,
    centroid: [f64; 3],
    centered_points: Vec<[f64; 3]>,
    axes: PrincipalAxes,
    variances: [f64; 3],
    instabilities: Vec<NumericalInstabilityWarning>,
}

impl OrientationEstimate {
    /// Raw angles in degrees, each within `(-180, 180]`.
    pub fn angles(&self) -> OrientationAngles {
        self.angles
    }

    /// Angles folded into `[-90, 90]`.
    pub fn normalized_angles(&self) -> OrientationAngles {
        self.angles.normalized()
    }

    /// Arithmetic mean of the input points.
    pub fn centroid(&self) -> [f64; 3] {
        self.centroid
    }

    /// Input points minus the centroid, in input order.
    pub fn centered_points(&self) -> &[[f64; 3]] {
        &self.centered_points
    }

    /// Principal axes ordered by descending variance.
    pub fn axes(&self) -> &PrincipalAxes {
        &self.axes
    }

    /// Variance along each principal axis (the covariance eigenvalues), descending.
    pub fn variances(&self) -> [f64; 3] {
        self.variances
    }

    /// Near-equal variance pairs detected during estimation.
    pub fn instabilities(&self) -> &[NumericalInstabilityWarning] {
        &self.instabilities
    }

    /// Whether every axis is separated from its neighbours by the configured tolerance.
    pub fn is_stable(&self) -> bool {
        self.instabilities.is_empty()
    }
}

fn compute_centroid(points: &[DVec3]) -> DVec3 {
    points.iter().fold(DVec3::ZERO, |acc, &p| acc + p) / points.len() as f64
}

/// Unbiased sample covariance `1/(N-1) Σ c cᵀ` of centered points.
fn compute_covariance(centered: &[DVec3]) -> DMat3 {
    let mut cov = DMat3::ZERO;
    for &c in centered {
        cov += DMat3::from_cols(c * c.x, c * c.y, c * c.z);
    }
    cov * (1.0 / (centered.len() - 1) as f64)
}

/// Counts eigenvalues above both the relative tolerance and the rounding noise of the input.
fn covariance_rank(variances: DVec3, points: &[DVec3], tolerance: f64) -> usize {
    let scale = points
        .iter()
        .fold(0.0_f64, |acc, p| acc.max(p.abs().max_element()));
    // centering error is at most N·ε·scale per coordinate; the trace of its
    // covariance over three axes is below 4.5 times that squared for N >= 3
    let rounding = points.len() as f64 * scale * f64::EPSILON;
    let noise_floor = 4.5 * rounding * rounding;
    let threshold = (tolerance * variances.x).max(noise_floor);

    variances.to_array().iter().filter(|&&v| v > threshold).count()
}

fn find_instabilities(variances: DVec3, tolerance: f64) -> Vec<NumericalInstabilityWarning> {
    let v = variances.to_array();
    (0..2)
        .filter_map(|i| {
            let relative_gap = (v[i] - v[i + 1]) / v[0];
            (relative_gap < tolerance).then_some(NumericalInstabilityWarning {
                leading_axis: i,
                trailing_axis: i + 1,
                relative_gap,
            })
        })
        .collect()
}

fn canonicalize_signs(axes: &mut [DVec3; 3]) {
    for (axis, &(num, den)) in axes.iter_mut().zip(ANGLE_COMPONENTS.iter()) {
        let flip = if axis[num].abs() > SIGN_EPSILON {
            axis[num] < 0.0
        } else {
            axis[den] < 0.0
        };
        if flip {
            *axis = -*axis;
        }
    }
}

fn axis_angles(axes: &[DVec3; 3]) -> OrientationAngles {
    let [pitch, roll, yaw] = [0, 1, 2].map(|i| {
        let (num, den) = ANGLE_COMPONENTS[i];
        axes[i][num].atan2(axes[i][den]).to_degrees()
    });
    OrientationAngles::new(pitch, roll, yaw)
}

/// Estimate the principal axes of a point cloud and the pitch, roll and yaw read from them.
///
/// # Arguments
///
/// * `cloud` - At least three points, not all collinear.
/// * `config` - Degeneracy and instability tolerances and the axis sign convention.
///
/// # Returns
///
/// The raw angles together with the centroid, centered points, principal axes
/// and per-axis variances. Near-equal variances do not fail the estimate; they
/// are listed in [`OrientationEstimate::instabilities`].
///
/// # Errors
///
/// [`DegenerateInputError`] when fewer than three points are given, when a
/// coordinate is not finite, or when the covariance rank is below two.
///
/// Example:
///
/// ```
/// use vbr_3d::pointcloud::PointCloud;
/// use vbr_orient::{estimate_orientation, EstimatorConfig};
///
/// let cloud = PointCloud::new(vec![
///     [4.0, 0.0, 0.0],
///     [-4.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, -1.0, 0.0],
///     [0.0, 0.0, 0.1],
/// ]);
/// let estimate = estimate_orientation(&cloud, &EstimatorConfig::default()).unwrap();
/// assert_eq!(estimate.axes().major()[0].abs(), 1.0);
/// ```
pub fn estimate_orientation(
    cloud: &PointCloud,
    config: &EstimatorConfig,
) -> Result<OrientationEstimate, DegenerateInputError> {
    if cloud.len() < MIN_POINTS {
        return Err(DegenerateInputError::TooFewPoints { count: cloud.len() });
    }

    if cloud.points().iter().flatten().any(|c| !c.is_finite()) {
        return Err(DegenerateInputError::NonFiniteCoordinates);
    }

    let points = cloud
        .points()
        .iter()
        .map(|p| DVec3::from_array(*p))
        .collect::<Vec<_>>();

    // center the points and compute their covariance
    let centroid = compute_centroid(&points);
    let centered = points.iter().map(|&p| p - centroid).collect::<Vec<_>>();
    let covariance = compute_covariance(&centered);

    if !covariance.is_finite() {
        return Err(DegenerateInputError::NonFiniteCoordinates);
    }

    // principal axes are the eigenvectors sorted by descending variance
    let eigen = symmetric_eigen3(&covariance).sorted_descending();
    let variances = eigen.eigenvalues();

    let rank = covariance_rank(variances, &points, config.degeneracy_tolerance);
    log::debug!("Variances: {:?}, rank: {}", variances, rank);

    if rank < 2 {
        return Err(DegenerateInputError::RankDeficient { rank });
    }

    let instabilities = find_instabilities(variances, config.instability_tolerance);
    for warning in &instabilities {
        log::debug!("{}", warning);
    }

    let mut axes = [eigen.eigenvector(0), eigen.eigenvector(1), eigen.eigenvector(2)];
    if config.sign_convention == AxisSignConvention::NonNegativeNumerator {
        canonicalize_signs(&mut axes);
    }

    Ok(OrientationEstimate {
        angles: axis_angles(&axes),
        centroid: centroid.to_array(),
        centered_points: centered.iter().map(|c| c.to_array()).collect(),
        axes: PrincipalAxes(axes.map(|a| a.to_array())),
        variances: variances.to_array(),
        instabilities,
    })
}
