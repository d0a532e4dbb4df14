/// STL reader module.
pub mod stl;
