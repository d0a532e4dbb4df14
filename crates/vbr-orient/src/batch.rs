use rayon::prelude::*;
use vbr_3d::pointcloud::PointCloud;

use crate::error::DegenerateInputError;
use crate::estimator::{estimate_orientation, EstimatorConfig};
use crate::profile::{OrientationProfile, ProfileBatch, SkippedEntry};

/// Builds ordered orientation profiles from named point clouds.
///
/// Every cloud is estimated independently. A cloud that fails estimation is
/// skipped, logged with its identifier and listed in [`ProfileBatch::skipped`];
/// the remaining clouds are still processed.
///
/// Example:
///
/// ```
/// use vbr_3d::pointcloud::PointCloud;
/// use vbr_orient::{BatchProfileBuilder, EstimatorConfig};
///
/// let flat = PointCloud::new(vec![
///     [2.0, 0.0, 0.0],
///     [-2.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, -1.0, 0.0],
/// ]);
/// let single = PointCloud::new(vec![[0.0, 0.0, 0.0]]);
///
/// let batch = BatchProfileBuilder::new(EstimatorConfig::default())
///     .build(vec![("a.stl", flat), ("b.stl", single)]);
///
/// assert_eq!(batch.len(), 1);
/// assert_eq!(batch.skipped()[0].identifier, "b.stl");
/// ```
#[derive(Debug, Clone)]
pub struct BatchProfileBuilder {
    config: EstimatorConfig,
    parallel: bool,
}

impl Default for BatchProfileBuilder {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl BatchProfileBuilder {
    /// Create a builder estimating every cloud with `config`, in parallel.
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            parallel: true,
        }
    }

    /// Choose between the rayon thread pool and the calling thread.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Get the estimator configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate every cloud and return the profiles in input order.
    ///
    /// # Arguments
    ///
    /// * `inputs` - `(identifier, cloud)` pairs in the order the profiles should appear.
    pub fn build<I, S>(&self, inputs: I) -> ProfileBatch
    where
        I: IntoIterator<Item = (S, PointCloud)>,
        S: Into<String>,
    {
        let inputs = inputs
            .into_iter()
            .map(|(identifier, cloud)| (identifier.into(), cloud))
            .collect::<Vec<(String, PointCloud)>>();

        log::debug!("Estimating orientation of {} point clouds", inputs.len());

        // one result slot per input, indexed collection keeps the input order
        let results = if self.parallel {
            inputs
                .par_iter()
                .map(|(identifier, cloud)| self.estimate_one(identifier, cloud))
                .collect::<Vec<_>>()
        } else {
            inputs
                .iter()
                .map(|(identifier, cloud)| self.estimate_one(identifier, cloud))
                .collect::<Vec<_>>()
        };

        let mut profiles = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();

        for ((identifier, _), result) in inputs.into_iter().zip(results) {
            match result {
                Ok(profile) => profiles.push(profile),
                Err(error) => {
                    log::warn!("Skipping {}: {}", identifier, error);
                    skipped.push(SkippedEntry {
                        identifier,
                        error: error.into(),
                    });
                }
            }
        }

        ProfileBatch::new(profiles, skipped)
    }

    /// Sort the inputs by `key` over their identifiers, then [`build`](Self::build).
    ///
    /// The sort is stable, inputs with equal keys keep their relative order.
    pub fn build_sorted_by_key<I, S, K, F>(&self, inputs: I, mut key: F) -> ProfileBatch
    where
        I: IntoIterator<Item = (S, PointCloud)>,
        S: Into<String>,
        K: Ord,
        F: FnMut(&str) -> K,
    {
        let mut inputs = inputs
            .into_iter()
            .map(|(identifier, cloud)| (identifier.into(), cloud))
            .collect::<Vec<(String, PointCloud)>>();
        inputs.sort_by_key(|(identifier, _)| key(identifier));
        self.build(inputs)
    }

    fn estimate_one(
        &self,
        identifier: &str,
        cloud: &PointCloud,
    ) -> Result<OrientationProfile, DegenerateInputError> {
        let estimate = estimate_orientation(cloud, &self.config)?;
        for warning in estimate.instabilities() {
            log::warn!("{}: {}", identifier, warning);
        }
        Ok(OrientationProfile::from_estimate(identifier, &estimate))
    }
}
