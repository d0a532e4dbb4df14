#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Eigendecomposition of symmetric 3x3 matrices.
pub mod eigen;
