//! ABI Cloud and Moisture Imagery scenes.
//!
//! A scene file stores one channel as packed 16-bit integers. Physical values
//! are recovered as `sample * scale_factor + add_offset`; this module adds a
//! caller-supplied correction on top (e.g. -273.15 to go from Kelvin to
//! Celsius) and masks fill samples as NaN.

use std::path::Path;

use chrono::{DateTime, Utc};
use goes_common::{parse_coverage_start, CalibratedGrid, Channel};
use projection::Geostationary;
use tracing::{debug, info, instrument};

use crate::attrs::{f32_attr, f64_attr, global_string_attr, i16_attr, string_attr};
use crate::error::{NetCdfError, NetCdfResult};
use crate::silence_hdf5_errors;

/// Name of the calibrated imagery variable in L2 CMIP files.
pub const CMI_VARIABLE: &str = "CMI";

const PROJECTION_VARIABLE: &str = "goes_imager_projection";

/// Packed-integer calibration read from a variable's attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub scale_factor: f32,
    pub add_offset: f32,
    /// Additive constant applied after scaling.
    pub correction: f32,
    /// Raw fill sample, compared bitwise before any scaling.
    pub fill: i16,
    /// Samples are unsigned 16-bit stored in a signed variable.
    pub unsigned: bool,
}

impl Calibration {
    /// Decode a raw sample to its integer value.
    #[inline]
    fn decode(&self, raw: i16) -> f32 {
        if self.unsigned {
            raw as u16 as f32
        } else {
            raw as f32
        }
    }

    /// Calibrated value of one raw sample, NaN for fill.
    #[inline]
    pub fn apply(&self, raw: i16) -> f32 {
        if raw == self.fill {
            f32::NAN
        } else {
            self.decode(raw) * self.scale_factor + self.add_offset + self.correction
        }
    }

    /// The fill value as a plain number (unsigned-aware).
    pub fn fill_value(&self) -> f32 {
        self.decode(self.fill)
    }

    pub fn apply_all(&self, raw: &[i16]) -> Vec<f32> {
        raw.iter().map(|&v| self.apply(v)).collect()
    }
}

/// One calibrated channel on its native fixed grid.
#[derive(Debug, Clone)]
pub struct Scene {
    /// File name without the `.nc` extension.
    pub name: String,
    pub variable: String,
    pub grid: CalibratedGrid,
    pub projection: Geostationary,
    /// Raw `time_coverage_start` global attribute.
    pub time_coverage_start: String,
    pub calibration: Calibration,
}

impl Scene {
    /// Acquisition start time parsed from `time_coverage_start`.
    pub fn acquisition_time(&self) -> NetCdfResult<DateTime<Utc>> {
        Ok(parse_coverage_start(&self.time_coverage_start)?)
    }

    /// Channel encoded in the scene name (`...-M6C07_G16_...`), if any.
    pub fn channel(&self) -> Option<Channel> {
        channel_from_name(&self.name)
    }
}

/// Extract the channel number from an ABI file name.
pub fn channel_from_name(name: &str) -> Option<Channel> {
    let product = name.split('_').nth(1)?;
    let (_, digits) = product.rsplit_once('C')?;
    let number: u8 = digits.parse().ok()?;
    Channel::new(number).ok()
}

/// Read `<dir>/<base_name>.nc` and calibrate `variable`.
pub fn read_scene(dir: &Path, base_name: &str, variable: &str, correction: f32) -> NetCdfResult<Scene> {
    let path = dir.join(format!("{}.nc", base_name));
    open_scene(&path, variable, correction)
}

/// Open a scene file and calibrate `variable` with an additive correction.
///
/// Missing metadata is an error; there are no silent defaults.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn open_scene(path: &Path, variable: &str, correction: f32) -> NetCdfResult<Scene> {
    silence_hdf5_errors();

    let file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let var = file
        .variable(variable)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", variable)))?;

    let dims = var.dimensions();
    if dims.len() != 2 {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has {} dimensions, expected 2",
            variable,
            dims.len()
        )));
    }
    let height = dims[0].len();
    let width = dims[1].len();

    let missing = |what: &str| NetCdfError::MissingData(format!("{}:{}", variable, what));
    let calibration = Calibration {
        scale_factor: f32_attr(&var, "scale_factor").ok_or_else(|| missing("scale_factor"))?,
        add_offset: f32_attr(&var, "add_offset").ok_or_else(|| missing("add_offset"))?,
        correction,
        fill: i16_attr(&var, "_FillValue").ok_or_else(|| missing("_FillValue"))?,
        unsigned: string_attr(&var, "_Unsigned").is_some_and(|v| v.eq_ignore_ascii_case("true")),
    };

    let time_coverage_start = global_string_attr(&file, "time_coverage_start")
        .ok_or_else(|| NetCdfError::MissingData("time_coverage_start attribute".to_string()))?;

    let raw: Vec<i16> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", variable, e)))?;

    debug!(
        width,
        height,
        scale_factor = calibration.scale_factor,
        add_offset = calibration.add_offset,
        fill = calibration.fill,
        unsigned = calibration.unsigned,
        "Read raw samples"
    );

    let values = calibration.apply_all(&raw);
    let grid = CalibratedGrid::new(values, width, height, calibration.fill_value())?;
    let projection = read_projection(&file, width, height)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(
        scene = %name,
        variable,
        width,
        height,
        time = %time_coverage_start,
        "Calibrated scene"
    );

    Ok(Scene {
        name,
        variable: variable.to_string(),
        grid,
        projection,
        time_coverage_start,
        calibration,
    })
}

/// Recover the fixed-grid projection from `goes_imager_projection` and the
/// packed `x`/`y` scan-angle coordinates.
fn read_projection(file: &netcdf::File, width: usize, height: usize) -> NetCdfResult<Geostationary> {
    let proj_var = file
        .variable(PROJECTION_VARIABLE)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", PROJECTION_VARIABLE)))?;

    let proj_attr = |name: &str| {
        f64_attr(&proj_var, name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{}:{}", PROJECTION_VARIABLE, name)))
    };

    let perspective_point_height = proj_attr("perspective_point_height")?;
    let semi_major_axis = proj_attr("semi_major_axis")?;
    let semi_minor_axis = proj_attr("semi_minor_axis")?;
    let longitude_origin = proj_attr("longitude_of_projection_origin")?;

    if let Some(sweep) = string_attr(&proj_var, "sweep_angle_axis") {
        if sweep != "x" {
            return Err(NetCdfError::InvalidFormat(format!(
                "unsupported sweep_angle_axis '{}'",
                sweep
            )));
        }
    }

    let (x_origin, dx) = read_scan_axis(file, "x", width)?;
    let (y_origin, dy) = read_scan_axis(file, "y", height)?;

    Ok(Geostationary::from_goes(
        perspective_point_height,
        semi_major_axis,
        semi_minor_axis,
        longitude_origin,
        x_origin,
        y_origin,
        dx,
        dy,
        width,
        height,
    ))
}

/// First scan angle and step (radians) of a packed coordinate variable.
fn read_scan_axis(file: &netcdf::File, name: &str, expected_len: usize) -> NetCdfResult<(f64, f64)> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;

    let scale = f32_attr(&var, "scale_factor")
        .ok_or_else(|| NetCdfError::MissingData(format!("{}:scale_factor", name)))? as f64;
    let offset = f32_attr(&var, "add_offset")
        .ok_or_else(|| NetCdfError::MissingData(format!("{}:add_offset", name)))? as f64;

    let raw: Vec<i16> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    if raw.len() != expected_len {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has {} values, data has {}",
            name,
            raw.len(),
            expected_len
        )));
    }

    let origin = raw[0] as f64 * scale + offset;
    let step = if raw.len() > 1 {
        (raw[1] as f64 - raw[0] as f64) * scale
    } else {
        scale
    };
    Ok((origin, step))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration(unsigned: bool) -> Calibration {
        Calibration {
            scale_factor: 0.5,
            add_offset: 100.0,
            correction: 0.0,
            fill: -1,
            unsigned,
        }
    }

    #[test]
    fn test_apply_affine() {
        let cal = calibration(false);
        assert_eq!(cal.apply(0), 100.0);
        assert_eq!(cal.apply(10), 105.0);
        assert!(cal.apply(-1).is_nan());
    }

    #[test]
    fn test_apply_correction() {
        let cal = Calibration {
            correction: -273.15,
            ..calibration(false)
        };
        assert!((cal.apply(400) - 26.85).abs() < 1e-4);
    }

    #[test]
    fn test_unsigned_samples() {
        let cal = calibration(true);
        // -2 as u16 is 65534
        assert_eq!(cal.apply(-2), 65534.0 * 0.5 + 100.0);
        assert!(cal.apply(-1).is_nan());
        assert_eq!(cal.fill_value(), 65535.0);
    }

    #[test]
    fn test_calibration_monotonic_over_all_samples() {
        for cal in [
            Calibration {
                scale_factor: 0.04,
                add_offset: 170.0,
                correction: -273.15,
                fill: -1,
                unsigned: true,
            },
            calibration(false),
        ] {
            let samples: Box<dyn Iterator<Item = i16>> = if cal.unsigned {
                Box::new((0..=u16::MAX).map(|u| u as i16))
            } else {
                Box::new(i16::MIN..=i16::MAX)
            };

            let mut previous = f32::NEG_INFINITY;
            for raw in samples.filter(|&raw| raw != cal.fill) {
                let value = cal.apply(raw);
                assert!(value.is_finite(), "raw {} gave {}", raw, value);
                assert!(value >= previous, "raw {} gave {} after {}", raw, value, previous);
                previous = value;
            }
        }
    }

    #[test]
    fn test_channel_from_name() {
        let name = "OR_ABI-L2-CMIPF-M6C07_G16_s20211881000206_e20211881009526_c20211881010012";
        assert_eq!(channel_from_name(name), Channel::new(7).ok());
        assert_eq!(channel_from_name("random"), None);
    }
}
