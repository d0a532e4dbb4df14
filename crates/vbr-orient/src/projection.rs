//! Plane views of an estimate, ready for 2D plotting.
//!
//! Each angle lives in one coordinate plane: pitch in YZ, roll in XZ and yaw in
//! XY. A [`PlaneView`] bundles the centered points projected onto that plane,
//! the endpoint of the matching principal axis drawn from the origin, and the
//! folded angle to label it with.

use serde::Serialize;

use crate::estimator::OrientationEstimate;

/// A coordinate plane, named after the angle measured in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionPlane {
    /// Pitch plane.
    Yz,
    /// Roll plane.
    Xz,
    /// Yaw plane.
    Xy,
}

impl ProjectionPlane {
    /// The three planes in pitch, roll, yaw order.
    pub const ALL: [ProjectionPlane; 3] = [Self::Yz, Self::Xz, Self::Xy];

    /// Indices of the (horizontal, vertical) coordinates kept by the projection.
    pub fn components(&self) -> (usize, usize) {
        match self {
            Self::Yz => (1, 2),
            Self::Xz => (0, 2),
            Self::Xy => (0, 1),
        }
    }

    /// Index of the principal axis whose angle is measured in this plane.
    pub fn axis_index(&self) -> usize {
        match self {
            Self::Yz => 0,
            Self::Xz => 1,
            Self::Xy => 2,
        }
    }

    /// Project a 3D point onto the plane.
    #[inline]
    pub fn project(&self, point: &[f64; 3]) -> [f64; 2] {
        let (u, v) = self.components();
        [point[u], point[v]]
    }
}

/// Project every point onto `plane`.
pub fn project_points(points: &[[f64; 3]], plane: ProjectionPlane) -> Vec<[f64; 2]> {
    points.iter().map(|p| plane.project(p)).collect()
}

/// Everything needed to draw one angle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaneView {
    /// The plane drawn.
    pub plane: ProjectionPlane,
    /// Centered points projected onto the plane.
    pub points: Vec<[f64; 2]>,
    /// Projected principal axis scaled by the requested length.
    pub axis_endpoint: [f64; 2],
    /// Folded angle in degrees.
    pub angle: f64,
}

/// Build the pitch, roll and yaw views of an estimate.
///
/// # Arguments
///
/// * `estimate` - The estimate to draw.
/// * `scale` - Length of the drawn axis, in point cloud units.
pub fn plane_views(estimate: &OrientationEstimate, scale: f64) -> [PlaneView; 3] {
    let angles = estimate.normalized_angles().to_array();

    ProjectionPlane::ALL.map(|plane| {
        let index = plane.axis_index();
        let axis = estimate.axes().axis(index);
        let [u, v] = plane.project(&axis);
        PlaneView {
            plane,
            points: project_points(estimate.centered_points(), plane),
            axis_endpoint: [u * scale, v * scale],
            angle: angles[index],
        }
    })
}
