mod parser;

pub use parser::*;

/// Error types for the STL module.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StlError {
    /// Failed to read STL file
    #[error("Failed to read STL file")]
    Io(#[from] std::io::Error),

    /// The payload is neither a complete binary STL nor an ASCII STL
    #[error("Truncated or unrecognised STL payload")]
    Truncated,

    /// A `vertex` line of an ASCII STL could not be parsed
    #[error("Malformed ASCII STL vertex at line {line}")]
    MalformedAscii {
        /// 1-based line number of the offending line.
        line: usize,
    },

    /// Invalid STL file extension
    #[error("Invalid STL file extension. Got:{0}")]
    InvalidFileExtension(String),
}
