//! Grid operations between calibration and rendering.
//!
//! - [`combine`]: pixel-wise arithmetic between aligned scenes (e.g. the
//!   night fog brightness temperature difference)
//! - [`reproject`]: nearest-neighbour warp from the geostationary fixed grid
//!   to a regular lon/lat grid

pub mod combine;
pub mod error;
pub mod interpolation;
pub mod reproject;

pub use combine::{difference, difference_grids};
pub use error::{GridError, GridResult};
pub use reproject::{reproject, reproject_to_file, reprojected_path, Reprojected, DEFAULT_RESOLUTION};
