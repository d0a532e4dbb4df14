#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// I/O utilities for reading triangulated surface models.
pub mod io;

/// Point cloud data type.
pub mod pointcloud;
