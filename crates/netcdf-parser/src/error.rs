//! Error types for NetCDF parsing operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// File present but not readable as expected
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Failure writing a NetCDF file
    #[error("Failed to write NetCDF: {0}")]
    WriteError(String),

    /// Values read from the file do not form a valid grid or extent
    #[error(transparent)]
    Grid(#[from] goes_common::GoesError),
}
