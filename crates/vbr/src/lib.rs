#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use vbr_3d as d3;

#[doc(inline)]
pub use vbr_linalg as linalg;

#[doc(inline)]
pub use vbr_orient as orient;
