//! Pixel-wise combination of aligned scenes.

use goes_common::CalibratedGrid;
use netcdf_parser::Scene;
use tracing::{debug, instrument};

use crate::error::{GridError, GridResult};

fn check_shape(first: &CalibratedGrid, second: &CalibratedGrid) -> GridResult<()> {
    if first.width != second.width || first.height != second.height {
        return Err(GridError::ShapeMismatch {
            first_width: first.width,
            first_height: first.height,
            second_width: second.width,
            second_height: second.height,
        });
    }
    Ok(())
}

/// `first - second` pixel by pixel. NaN (no-data) in either input gives NaN.
///
/// The result keeps the first grid's fill value.
pub fn difference_grids(first: &CalibratedGrid, second: &CalibratedGrid) -> GridResult<CalibratedGrid> {
    check_shape(first, second)?;

    let values: Vec<f32> = first
        .values
        .iter()
        .zip(&second.values)
        .map(|(a, b)| a - b)
        .collect();

    Ok(CalibratedGrid::new(values, first.width, first.height, first.fill_value)?)
}

/// Brightness temperature difference of two scenes on the same fixed grid.
///
/// Both scenes must have the same shape and native projection; the result
/// carries the first scene's projection, fill value and acquisition time.
#[instrument(skip_all, fields(first = %first.name, second = %second.name))]
pub fn difference(first: &Scene, second: &Scene) -> GridResult<Scene> {
    check_shape(&first.grid, &second.grid)?;

    if !first.projection.same_grid(&second.projection) {
        return Err(GridError::ProjectionMismatch(format!(
            "{} and {} are not on the same fixed grid",
            first.name, second.name
        )));
    }

    let grid = difference_grids(&first.grid, &second.grid)?;
    debug!(
        valid = grid.values.iter().filter(|v| v.is_finite()).count(),
        "Computed difference"
    );

    Ok(Scene {
        name: first.name.clone(),
        variable: format!("{}-{}", first.variable, second.variable),
        grid,
        projection: first.projection.clone(),
        time_coverage_start: first.time_coverage_start.clone(),
        calibration: first.calibration,
    })
}
