#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Angle folding into the canonical band.
pub mod angles;

/// Batch estimation over named point clouds.
pub mod batch;

/// Error and warning types.
pub mod error;

/// Principal axis estimation.
pub mod estimator;

/// Per-cloud orientation results.
pub mod profile;

/// 2D plane views for renderers.
pub mod projection;

pub use angles::{normalize_angle, OrientationAngles};
pub use batch::BatchProfileBuilder;
pub use error::{DegenerateInputError, NumericalInstabilityWarning};
pub use estimator::{
    estimate_orientation, AxisSignConvention, EstimatorConfig, OrientationEstimate, PrincipalAxes,
};
pub use profile::{OrientationProfile, ProfileBatch, SkipReason, SkippedEntry};
pub use projection::{plane_views, PlaneView, ProjectionPlane};
