use serde::Serialize;

use crate::error::{DegenerateInputError, NumericalInstabilityWarning};
use crate::estimator::{OrientationEstimate, PrincipalAxes};

/// Orientation of one named point cloud.
///
/// Built once from an [`OrientationEstimate`]; the angles are folded into `[-90, 90]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrientationProfile {
    identifier: String,
    centroid: [f64; 3],
    axes: PrincipalAxes,
    pitch: f64,
    roll: f64,
    yaw: f64,
    variances: [f64; 3],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    instabilities: Vec<NumericalInstabilityWarning>,
}

impl OrientationProfile {
    /// Package an estimate under the name of its source.
    pub fn from_estimate(identifier: impl Into<String>, estimate: &OrientationEstimate) -> Self {
        let angles = estimate.normalized_angles();
        Self {
            identifier: identifier.into(),
            centroid: estimate.centroid(),
            axes: *estimate.axes(),
            pitch: angles.pitch,
            roll: angles.roll,
            yaw: angles.yaw,
            variances: estimate.variances(),
            instabilities: estimate.instabilities().to_vec(),
        }
    }

    /// Name of the source the point cloud came from.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Centroid of the source points.
    pub fn centroid(&self) -> [f64; 3] {
        self.centroid
    }

    /// Principal axes ordered by descending variance.
    pub fn axes(&self) -> &PrincipalAxes {
        &self.axes
    }

    /// Normalized pitch in degrees.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Normalized roll in degrees.
    pub fn roll(&self) -> f64 {
        self.roll
    }

    /// Normalized yaw in degrees.
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Variance along each principal axis, descending.
    pub fn variances(&self) -> [f64; 3] {
        self.variances
    }

    /// Near-equal variance pairs; the angles of the listed axes are unreliable.
    pub fn instabilities(&self) -> &[NumericalInstabilityWarning] {
        &self.instabilities
    }
}

/// Why an input produced no profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SkipReason {
    /// The point cloud failed estimation.
    #[error(transparent)]
    Degenerate(#[from] DegenerateInputError),

    /// The source could not be turned into a point cloud.
    #[error("Failed to load: {0}")]
    Unreadable(String),
}

/// An input that produced no profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    /// Name of the skipped input.
    pub identifier: String,
    /// Why the input was skipped.
    #[serde(serialize_with = "serialize_reason")]
    pub error: SkipReason,
}

impl SkippedEntry {
    /// An entry for a source that failed before estimation, e.g. an unreadable file.
    pub fn unreadable(identifier: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            identifier: identifier.into(),
            error: SkipReason::Unreadable(error.to_string()),
        }
    }
}

fn serialize_reason<S: serde::Serializer>(
    error: &SkipReason,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Ordered profiles of a batch, plus the inputs that were skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfileBatch {
    profiles: Vec<OrientationProfile>,
    skipped: Vec<SkippedEntry>,
}

impl ProfileBatch {
    pub(crate) fn new(profiles: Vec<OrientationProfile>, skipped: Vec<SkippedEntry>) -> Self {
        Self { profiles, skipped }
    }

    /// Profiles in input order.
    pub fn profiles(&self) -> &[OrientationProfile] {
        &self.profiles
    }

    /// Inputs that produced no profile, sorted by identifier when
    /// [`add_skipped`](Self::add_skipped) was used, otherwise in input order.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Record inputs that never reached estimation, such as files that failed to load.
    ///
    /// The skipped list is re-sorted by identifier so that it lines up with
    /// batches built with [`build_sorted_by_key`](crate::BatchProfileBuilder::build_sorted_by_key).
    pub fn add_skipped(&mut self, entries: impl IntoIterator<Item = SkippedEntry>) {
        self.skipped.extend(entries);
        self.skipped.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    }

    /// Number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profile was produced.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Consume the batch and return its profiles.
    pub fn into_profiles(self) -> Vec<OrientationProfile> {
        self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{estimate_orientation, EstimatorConfig};
    use vbr_3d::pointcloud::PointCloud;

    fn tilted_cloud() -> PointCloud {
        PointCloud::new(vec![
            [3.0, 0.0, 0.0],
            [-3.0, 0.0, 0.0],
            [0.0, 1.0, 1.0],
            [0.0, -1.0, -1.0],
            [0.0, 0.2, -0.2],
            [0.0, -0.2, 0.2],
        ])
    }

    #[test]
    fn test_profile_from_estimate() -> Result<(), DegenerateInputError> {
        let estimate = estimate_orientation(&tilted_cloud(), &EstimatorConfig::default())?;
        let profile = OrientationProfile::from_estimate("L1.stl", &estimate);

        assert_eq!(profile.identifier(), "L1.stl");
        assert_eq!(profile.centroid(), estimate.centroid());
        assert_eq!(profile.axes(), estimate.axes());
        assert_eq!(profile.variances(), estimate.variances());

        let normalized = estimate.normalized_angles();
        assert_eq!(profile.pitch(), normalized.pitch);
        assert_eq!(profile.roll(), normalized.roll);
        assert_eq!(profile.yaw(), normalized.yaw);
        for angle in [profile.pitch(), profile.roll(), profile.yaw()] {
            assert!((-90.0..=90.0).contains(&angle));
        }
        Ok(())
    }

    #[test]
    fn test_profile_serialize_field_names() -> Result<(), Box<dyn std::error::Error>> {
        let estimate = estimate_orientation(&tilted_cloud(), &EstimatorConfig::default())?;
        let profile = OrientationProfile::from_estimate("L2.stl", &estimate);

        let json = serde_json::to_value(&profile)?;
        for field in ["identifier", "centroid", "axes", "pitch", "roll", "yaw"] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["identifier"], "L2.stl");
        assert_eq!(json["axes"].as_array().map(|a| a.len()), Some(3));
        assert!(json.get("instabilities").is_none());
        Ok(())
    }

    #[test]
    fn test_skipped_entry_serializes_message() -> Result<(), serde_json::Error> {
        let entry = SkippedEntry {
            identifier: "broken.stl".to_string(),
            error: DegenerateInputError::TooFewPoints { count: 1 }.into(),
        };
        let json = serde_json::to_value(&entry)?;
        assert_eq!(json["error"], "Expected at least 3 points, got 1");

        let entry = SkippedEntry::unreadable("empty.stl", "Truncated STL data");
        let json = serde_json::to_value(&entry)?;
        assert_eq!(json["error"], "Failed to load: Truncated STL data");
        Ok(())
    }

    #[test]
    fn test_add_skipped_keeps_identifier_order() -> Result<(), serde_json::Error> {
        let mut batch = ProfileBatch::new(
            vec![],
            vec![SkippedEntry {
                identifier: "L2.stl".to_string(),
                error: DegenerateInputError::RankDeficient { rank: 1 }.into(),
            }],
        );
        batch.add_skipped([
            SkippedEntry::unreadable("L4.stl", "Truncated STL data"),
            SkippedEntry::unreadable("L1.stl", "Truncated STL data"),
        ]);

        let ids = batch
            .skipped()
            .iter()
            .map(|entry| entry.identifier.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["L1.stl", "L2.stl", "L4.stl"]);
        assert!(matches!(batch.skipped()[0].error, SkipReason::Unreadable(_)));

        let json = serde_json::to_value(&batch)?;
        assert_eq!(json["skipped"].as_array().map(|a| a.len()), Some(3));
        Ok(())
    }
}
