/// An ordered collection of 3D points.
///
/// The point order is the order the points were produced by the reader; for
/// triangulated surfaces every facet contributes its three vertices in turn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
}

impl PointCloud {
    /// Create a new point cloud from points.
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Consume the point cloud and return its points.
    pub fn into_points(self) -> Vec<[f64; 3]> {
        self.points
    }

    /// Return a copy of the point cloud shifted by `offset`.
    pub fn translated(&self, offset: &[f64; 3]) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]])
            .collect();
        Self { points }
    }
}

impl From<Vec<[f64; 3]>> for PointCloud {
    fn from(points: Vec<[f64; 3]>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() {
        let pointcloud = PointCloud::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);

        assert_eq!(pointcloud.len(), 2);
        assert!(!pointcloud.is_empty());
        assert_eq!(pointcloud.points().len(), 2);

        if let Some(p0) = pointcloud.points().first() {
            assert_eq!(p0[0], 0.0);
            assert_eq!(p0[1], 0.0);
            assert_eq!(p0[2], 0.0);
        }

        if let Some(p1) = pointcloud.points().last() {
            assert_eq!(p1[0], 1.0);
            assert_eq!(p1[1], 0.0);
            assert_eq!(p1[2], 0.0);
        }
    }

    #[test]
    fn test_pointcloud_translated() {
        let pointcloud = PointCloud::from(vec![[0.0, 1.0, 2.0], [-1.0, 0.5, 3.0]]);
        let shifted = pointcloud.translated(&[10.0, -2.0, 0.5]);

        assert_eq!(shifted.points(), &[[10.0, -1.0, 2.5], [9.0, -1.5, 3.5]]);
        // the source cloud is untouched
        assert_eq!(pointcloud.points()[0], [0.0, 1.0, 2.0]);
        assert_eq!(shifted.into_points().len(), 2);
    }

    #[test]
    fn test_pointcloud_empty() {
        let pointcloud = PointCloud::default();
        assert!(pointcloud.is_empty());
        assert_eq!(pointcloud.len(), 0);
    }
}
