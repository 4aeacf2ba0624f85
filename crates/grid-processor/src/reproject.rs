//! Reprojection from the geostationary fixed grid to a lon/lat grid.
//!
//! Every output cell centre is projected into the source scan-angle grid and
//! takes the value of the nearest source pixel. Cells that fall off the
//! Earth disk, outside the source grid, or on a no-data pixel are NaN.

use std::path::{Path, PathBuf};

use goes_common::{CalibratedGrid, Extent, GeographicGrid};
use netcdf_parser::{write_geographic_grid, Scene};
use projection::Geostationary;
use tracing::{debug, info, instrument, warn};

use crate::error::{GridError, GridResult};
use crate::interpolation::nearest_interpolate;

/// Output cell size in degrees.
pub const DEFAULT_RESOLUTION: f64 = 0.02;

/// A warped grid together with the file it was written to.
#[derive(Debug, Clone)]
pub struct Reprojected {
    pub path: PathBuf,
    pub grid: GeographicGrid,
}

/// Warp a calibrated fixed-grid image onto a regular lon/lat grid covering
/// `extent` at `resolution` degrees.
pub fn reproject(
    grid: &CalibratedGrid,
    proj: &Geostationary,
    extent: &Extent,
    resolution: f64,
) -> GridResult<GeographicGrid> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(GridError::InvalidResolution(resolution));
    }

    let (src_width, src_height) = proj.dimensions();
    if src_width != grid.width || src_height != grid.height {
        return Err(GridError::ShapeMismatch {
            first_width: grid.width,
            first_height: grid.height,
            second_width: src_width,
            second_height: src_height,
        });
    }

    // Warp corners are upper-left then lower-right.
    let [ul_lon, ul_lat, lr_lon, lr_lat] = extent.warp_corners();
    let (width, height) = extent.grid_size(resolution);
    debug!(ul_lon, ul_lat, lr_lon, lr_lat, width, height, resolution, "Warp target");

    let mut output = vec![f32::NAN; width * height];
    for row in 0..height {
        let lat = ul_lat - (row as f64 + 0.5) * resolution;
        for col in 0..width {
            let lon = ul_lon + (col as f64 + 0.5) * resolution;

            if let Some((i, j)) = proj.geo_to_grid(lon, lat) {
                let value = nearest_interpolate(&grid.values, grid.width, grid.height, i, j);
                if !grid.is_missing(value) {
                    output[row * width + col] = value;
                }
            }
        }
    }

    Ok(GeographicGrid::new(output, width, height, *extent, resolution)?)
}

/// `<target_stem>_ret.nc`
pub fn reprojected_path(target_stem: &Path) -> PathBuf {
    let mut name = target_stem
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("_ret.nc");
    target_stem.with_file_name(name)
}

/// Warp a scene and write the result next to `target_stem` as
/// `<target_stem>_ret.nc`.
#[instrument(skip_all, fields(scene = %scene.name, extent = %extent, stem = %target_stem.display()))]
pub fn reproject_to_file(
    scene: &Scene,
    extent: &Extent,
    resolution: f64,
    target_stem: &Path,
) -> GridResult<Reprojected> {
    let grid = reproject(&scene.grid, &scene.projection, extent, resolution)?;

    let valid = grid.valid_count();
    if valid == 0 {
        warn!("Extent has no valid pixels; it may lie outside the satellite view");
    }

    let path = reprojected_path(target_stem);
    write_geographic_grid(&path, &grid)?;

    info!(
        path = %path.display(),
        width = grid.width,
        height = grid.height,
        valid,
        "Reprojected scene"
    );

    Ok(Reprojected { path, grid })
}
