//! Geographic extent of a region of interest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GoesError;

/// A lon/lat rectangle in degrees, stored in the order the caller supplies it:
/// `[min_lon, max_lon, min_lat, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Create a validated extent.
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Result<Self, GoesError> {
        let extent = Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        };
        extent.validate()?;
        Ok(extent)
    }

    fn validate(&self) -> Result<(), GoesError> {
        let values = [self.min_lon, self.max_lon, self.min_lat, self.max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GoesError::InvalidExtent(format!("non-finite bound in {}", self)));
        }
        if self.min_lon >= self.max_lon {
            return Err(GoesError::InvalidExtent(format!(
                "min_lon {} must be less than max_lon {}",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat >= self.max_lat {
            return Err(GoesError::InvalidExtent(format!(
                "min_lat {} must be less than max_lat {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon < -180.0 || self.max_lon > 180.0 {
            return Err(GoesError::InvalidExtent(format!("longitude out of range in {}", self)));
        }
        if self.min_lat < -90.0 || self.max_lat > 90.0 {
            return Err(GoesError::InvalidExtent(format!("latitude out of range in {}", self)));
        }
        Ok(())
    }

    /// Corner order expected by the warp step: upper-left then lower-right,
    /// `[min_lon, max_lat, max_lon, min_lat]`.
    pub fn warp_corners(&self) -> [f64; 4] {
        [self.min_lon, self.max_lat, self.max_lon, self.min_lat]
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check whether a point lies inside (edges inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Number of columns and rows of a regular grid at `resolution` degrees.
    pub fn grid_size(&self, resolution: f64) -> (usize, usize) {
        let width = (self.width() / resolution).round().max(1.0) as usize;
        let height = (self.height() / resolution).round().max(1.0) as usize;
        (width, height)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug formatting keeps the trailing ".0" on whole degrees.
        write!(
            f,
            "[{:?}, {:?}, {:?}, {:?}]",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

impl FromStr for Extent {
    type Err = GoesError;

    /// Parse "min_lon,max_lon,min_lat,max_lat". Brackets and spaces are tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GoesError::InvalidExtent(format!(
                "expected 4 comma-separated values, got '{}'",
                s
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| GoesError::InvalidExtent(format!("invalid number '{}'", part)))?;
        }
        Self::try_from(values)
    }
}

impl TryFrom<[f64; 4]> for Extent {
    type Error = GoesError;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Extent> for [f64; 4] {
    fn from(e: Extent) -> Self {
        [e.min_lon, e.max_lon, e.min_lat, e.max_lat]
    }
}
