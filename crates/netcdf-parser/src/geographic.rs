//! Geographic (lon/lat) grid files.
//!
//! Reprojected grids are written CF-style: `lat` and `lon` coordinate
//! variables holding cell centres, latitude ascending, and a single `f32`
//! data variable with NaN as fill. In memory the grid is north-up, so rows
//! are flipped on the way in and out.

use std::path::Path;

use goes_common::{Extent, GeographicGrid};
use tracing::{debug, instrument};

use crate::error::{NetCdfError, NetCdfResult};
use crate::silence_hdf5_errors;

/// Data variable name in geographic grid files.
pub const GEOGRAPHIC_VARIABLE: &str = "Band1";

fn write_err(e: impl std::fmt::Display) -> NetCdfError {
    NetCdfError::WriteError(e.to_string())
}

/// Write a north-up grid to `path`, replacing any existing file.
#[instrument(skip_all, fields(path = %path.display(), width = grid.width, height = grid.height))]
pub fn write_geographic_grid(path: &Path, grid: &GeographicGrid) -> NetCdfResult<()> {
    silence_hdf5_errors();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let (width, height) = (grid.width, grid.height);
    // Same cell centres as the in-memory grid, south first.
    let lats: Vec<f64> = (0..height).rev().map(|row| grid.lat_at(row)).collect();
    let lons: Vec<f64> = (0..width).map(|c| grid.lon_at(c)).collect();

    // South row first to match ascending latitude.
    let mut south_up = Vec::with_capacity(grid.data.len());
    for row in (0..height).rev() {
        south_up.extend_from_slice(&grid.data[row * width..(row + 1) * width]);
    }

    let mut file = netcdf::create(path).map_err(write_err)?;
    file.add_attribute("Conventions", "CF-1.5").map_err(write_err)?;
    file.add_dimension("lat", height).map_err(write_err)?;
    file.add_dimension("lon", width).map_err(write_err)?;

    {
        let mut var = file.add_variable::<f64>("lat", &["lat"]).map_err(write_err)?;
        var.put_attribute("standard_name", "latitude").map_err(write_err)?;
        var.put_attribute("units", "degrees_north").map_err(write_err)?;
        var.put_values(&lats, ..).map_err(write_err)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"]).map_err(write_err)?;
        var.put_attribute("standard_name", "longitude").map_err(write_err)?;
        var.put_attribute("units", "degrees_east").map_err(write_err)?;
        var.put_values(&lons, ..).map_err(write_err)?;
    }
    {
        let mut var = file
            .add_variable::<f32>(GEOGRAPHIC_VARIABLE, &["lat", "lon"])
            .map_err(write_err)?;
        var.put_attribute("_FillValue", f32::NAN).map_err(write_err)?;
        var.put_attribute("long_name", "reprojected values").map_err(write_err)?;
        var.put_values(&south_up, ..).map_err(write_err)?;
    }

    debug!(valid = grid.valid_count(), "Wrote geographic grid");
    Ok(())
}

/// Read a geographic grid file back into a north-up grid.
///
/// The extent is recovered from the cell-centre coordinates.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn read_geographic_grid(path: &Path) -> NetCdfResult<GeographicGrid> {
    silence_hdf5_errors();

    let file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let lats = read_coordinate(&file, "lat")?;
    let lons = read_coordinate(&file, "lon")?;
    let (width, height) = (lons.len(), lats.len());

    let var = file
        .variable(GEOGRAPHIC_VARIABLE)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", GEOGRAPHIC_VARIABLE)))?;
    let data: Vec<f32> = var.get_values(..).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to read {}: {}", GEOGRAPHIC_VARIABLE, e))
    })?;

    if data.len() != width * height {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has {} values for a {}x{} grid",
            GEOGRAPHIC_VARIABLE,
            data.len(),
            width,
            height
        )));
    }

    let resolution = if width > 1 {
        (lons[1] - lons[0]).abs()
    } else if height > 1 {
        (lats[1] - lats[0]).abs()
    } else {
        return Err(NetCdfError::InvalidFormat(
            "cannot infer resolution from a single cell".to_string(),
        ));
    };

    let ascending = height > 1 && lats[0] < lats[height - 1];
    let data = if ascending {
        let mut north_up = Vec::with_capacity(data.len());
        for row in (0..height).rev() {
            north_up.extend_from_slice(&data[row * width..(row + 1) * width]);
        }
        north_up
    } else {
        data
    };

    let half = resolution / 2.0;
    let (lat_a, lat_b) = (lats[0], lats[height - 1]);
    // Clamp so float noise on a global grid stays a valid extent.
    let extent = Extent::new(
        (lons[0].min(lons[width - 1]) - half).max(-180.0),
        (lons[0].max(lons[width - 1]) + half).min(180.0),
        (lat_a.min(lat_b) - half).max(-90.0),
        (lat_a.max(lat_b) + half).min(90.0),
    )?;

    Ok(GeographicGrid::new(data, width, height, extent, resolution)?)
}

fn read_coordinate(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;
    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
    if values.is_empty() {
        return Err(NetCdfError::InvalidFormat(format!("{} is empty", name)));
    }
    Ok(values)
}
