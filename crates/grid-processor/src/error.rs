//! Error types for grid processing.

use thiserror::Error;

pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridError {
    /// Two grids that must line up pixel for pixel do not.
    #[error("grid shapes differ: {first_width}x{first_height} vs {second_width}x{second_height}")]
    ShapeMismatch {
        first_width: usize,
        first_height: usize,
        second_width: usize,
        second_height: usize,
    },

    /// Two scenes sit on different fixed grids.
    #[error("native projections differ: {0}")]
    ProjectionMismatch(String),

    /// Output resolution must be a positive number of degrees.
    #[error("invalid resolution: {0}")]
    InvalidResolution(f64),

    #[error(transparent)]
    Grid(#[from] goes_common::GoesError),

    /// Reading or writing a grid file failed.
    #[error("grid file error: {0}")]
    File(#[from] netcdf_parser::NetCdfError),
}
