//! Error types shared by the pipeline crates.

use thiserror::Error;

/// Result type alias using GoesError.
pub type GoesResult<T> = Result<T, GoesError>;

/// Errors raised while validating pipeline inputs.
#[derive(Debug, Error)]
pub enum GoesError {
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Invalid scan time '{0}': expected YYYYMMDDHHMM")]
    InvalidScanTime(String),

    #[error("Invalid coverage time: {0}")]
    InvalidCoverageTime(String),

    #[error("Invalid channel {0}: ABI channels are numbered 1-16")]
    InvalidChannel(u8),

    #[error("Grid of {width}x{height} cannot hold {len} values")]
    GridSize {
        width: usize,
        height: usize,
        len: usize,
    },
}
