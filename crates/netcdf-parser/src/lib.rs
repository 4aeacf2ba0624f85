//! NetCDF access for GOES-R ABI imagery.
//!
//! Reads Cloud and Moisture Imagery (`CMI`) scenes, applies the packed
//! scale/offset calibration, recovers the fixed-grid projection, and
//! reads/writes the geographic grids produced by reprojection.
//!
//! Requires the system NetCDF and HDF5 libraries (libnetcdf-dev, libhdf5-dev).

mod attrs;
pub mod error;
pub mod geographic;
pub mod scene;

pub use error::{NetCdfError, NetCdfResult};
pub use geographic::{read_geographic_grid, write_geographic_grid, GEOGRAPHIC_VARIABLE};
pub use scene::{channel_from_name, open_scene, read_scene, Calibration, Scene, CMI_VARIABLE};

use std::sync::Once;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostic stacks even when the caller handles
/// the error (for example probing an optional attribute). Safe to call more
/// than once; only the first call has an effect.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with a null handler disables automatic printing
        // for the default error stack.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}
