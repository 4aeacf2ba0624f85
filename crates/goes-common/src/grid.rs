//! In-memory raster grids passed between pipeline stages.

use crate::error::GoesError;
use crate::extent::Extent;

/// Calibrated samples on the native fixed grid, row-major, north-up.
///
/// No-data pixels (raw sample equal to `fill_value`) are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedGrid {
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// Raw fill value reported by the source file.
    pub fill_value: f32,
}

impl CalibratedGrid {
    pub fn new(values: Vec<f32>, width: usize, height: usize, fill_value: f32) -> Result<Self, GoesError> {
        if values.len() != width * height {
            return Err(GoesError::GridSize {
                width,
                height,
                len: values.len(),
            });
        }
        Ok(Self {
            values,
            width,
            height,
            fill_value,
        })
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col < self.width && row < self.height {
            Some(self.values[row * self.width + col])
        } else {
            None
        }
    }

    /// Whether a value should be treated as no-data.
    pub fn is_missing(&self, value: f32) -> bool {
        value.is_nan() || value == self.fill_value
    }

    /// Min and max over valid pixels, if any.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        finite_range(&self.values)
    }
}

/// A regular lon/lat raster, row-major, first row at the northern edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GeographicGrid {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub extent: Extent,
    /// Cell size in degrees.
    pub resolution: f64,
}

impl GeographicGrid {
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        extent: Extent,
        resolution: f64,
    ) -> Result<Self, GoesError> {
        if data.len() != width * height {
            return Err(GoesError::GridSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            extent,
            resolution,
        })
    }

    /// Longitude of a column centre.
    pub fn lon_at(&self, col: usize) -> f64 {
        self.extent.min_lon + (col as f64 + 0.5) * self.resolution
    }

    /// Latitude of a row centre.
    pub fn lat_at(&self, row: usize) -> f64 {
        self.extent.max_lat - (row as f64 + 0.5) * self.resolution
    }

    /// Nearest cell value at a geographic position, NaN outside the grid.
    pub fn sample(&self, lon: f64, lat: f64) -> f32 {
        let col = ((lon - self.extent.min_lon) / self.resolution).floor();
        let row = ((self.extent.max_lat - lat) / self.resolution).floor();
        if col < 0.0 || row < 0.0 {
            return f32::NAN;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.width || row >= self.height {
            return f32::NAN;
        }
        self.data[row * self.width + col]
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    pub fn valid_range(&self) -> Option<(f32, f32)> {
        finite_range(&self.data)
    }
}

fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
