//! Synthetic data generators.
//!
//! [`SyntheticScene`] produces ABI-shaped NetCDF files (packed `CMI`,
//! `goes_imager_projection`, packed `x`/`y` scan angles) from an analytic
//! brightness temperature field, so the full pipeline can run offline.

use std::path::Path;

use projection::Geostationary;

/// Packing used for synthetic brightness temperatures (Kelvin).
pub const BT_SCALE_FACTOR: f32 = 0.04;
pub const BT_ADD_OFFSET: f32 = 170.0;
/// Raw fill sample; 65535 once read as unsigned.
pub const BT_FILL: i16 = -1;

/// Smooth brightness temperature field in Kelvin, roughly 225-305 K on the disk.
pub fn kelvin_field(lon: f64, lat: f64) -> f32 {
    (300.0 - 0.8 * lat.abs() + 3.0 * (lon / 10.0).sin()) as f32
}

/// An ABI scene held in memory as raw packed samples.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    pub projection: Geostationary,
    /// Row-major raw samples, `projection.ny` rows of `projection.nx`.
    pub raw: Vec<i16>,
    pub scale_factor: f32,
    pub add_offset: f32,
    pub fill_value: i16,
    pub unsigned: bool,
    pub time_coverage_start: String,
}

impl SyntheticScene {
    /// Sample `field(lon, lat)` (Kelvin) at every pixel centre. Pixels that
    /// look into space get the fill value.
    pub fn from_field(projection: Geostationary, field: impl Fn(f64, f64) -> f32) -> Self {
        let (nx, ny) = projection.dimensions();
        let mut raw = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let sample = match projection.grid_to_geo(i as f64, j as f64) {
                    Some((lon, lat)) => pack(field(lon, lat)),
                    None => BT_FILL,
                };
                raw.push(sample);
            }
        }

        Self {
            projection,
            raw,
            scale_factor: BT_SCALE_FACTOR,
            add_offset: BT_ADD_OFFSET,
            fill_value: BT_FILL,
            unsigned: true,
            time_coverage_start: crate::fixtures::FOG_COVERAGE_START.to_string(),
        }
    }

    /// Constant-valued scene of `width` x `height` pixels on a small patch of
    /// the full disk around nadir.
    pub fn uniform(width: usize, height: usize, kelvin: f32) -> Self {
        let mut projection = Geostationary::goes16_full_disk();
        projection.x_origin = -(width as f64 / 2.0) * projection.dx;
        projection.y_origin = -(height as f64 / 2.0) * projection.dy;
        projection.nx = width;
        projection.ny = height;
        Self::from_field(projection, |_, _| kelvin)
    }

    pub fn with_time(mut self, time_coverage_start: &str) -> Self {
        self.time_coverage_start = time_coverage_start.to_string();
        self
    }

    pub fn raw_at(&self, col: usize, row: usize) -> i16 {
        self.raw[row * self.projection.nx + col]
    }

    /// Calibrated value the reader should produce for a pixel, None for fill.
    pub fn expected_kelvin(&self, col: usize, row: usize) -> Option<f32> {
        let raw = self.raw_at(col, row);
        if raw == self.fill_value {
            return None;
        }
        let decoded = if self.unsigned { raw as u16 as f32 } else { raw as f32 };
        Some(decoded * self.scale_factor + self.add_offset)
    }

    /// Write as an ABI-style NetCDF file with a `CMI` variable.
    pub fn write(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.write_variable(path, "CMI")
    }

    /// Write with the imagery stored under `variable`.
    pub fn write_variable(&self, path: &Path, variable: &str) -> Result<(), Box<dyn std::error::Error>> {
        let proj = &self.projection;
        let (nx, ny) = proj.dimensions();

        let mut file = netcdf::create(path)?;
        file.add_attribute("time_coverage_start", self.time_coverage_start.as_str())?;
        file.add_attribute("platform_ID", "G16")?;
        file.add_dimension("y", ny)?;
        file.add_dimension("x", nx)?;

        {
            let mut var = file.add_variable::<i16>(variable, &["y", "x"])?;
            var.put_attribute("_FillValue", self.fill_value)?;
            var.put_attribute("scale_factor", self.scale_factor)?;
            var.put_attribute("add_offset", self.add_offset)?;
            if self.unsigned {
                var.put_attribute("_Unsigned", "true")?;
            }
            var.put_attribute("units", "K")?;
            var.put_values(&self.raw, ..)?;
        }

        let x_raw: Vec<i16> = (0..nx as i16).collect();
        let y_raw: Vec<i16> = (0..ny as i16).collect();
        {
            let mut var = file.add_variable::<i16>("x", &["x"])?;
            var.put_attribute("scale_factor", proj.dx as f32)?;
            var.put_attribute("add_offset", proj.x_origin as f32)?;
            var.put_attribute("units", "rad")?;
            var.put_values(&x_raw, ..)?;
        }
        {
            let mut var = file.add_variable::<i16>("y", &["y"])?;
            var.put_attribute("scale_factor", proj.dy as f32)?;
            var.put_attribute("add_offset", proj.y_origin as f32)?;
            var.put_attribute("units", "rad")?;
            var.put_values(&y_raw, ..)?;
        }
        {
            let mut var = file.add_variable::<i32>("goes_imager_projection", &[])?;
            var.put_attribute("grid_mapping_name", "geostationary")?;
            var.put_attribute("perspective_point_height", proj.perspective_point_height)?;
            var.put_attribute("semi_major_axis", proj.req)?;
            var.put_attribute("semi_minor_axis", proj.rpol)?;
            var.put_attribute("longitude_of_projection_origin", proj.longitude_origin_deg())?;
            var.put_attribute("latitude_of_projection_origin", 0.0f64)?;
            var.put_attribute("sweep_angle_axis", "x")?;
        }

        Ok(())
    }
}

fn pack(kelvin: f32) -> i16 {
    let counts = ((kelvin - BT_ADD_OFFSET) / BT_SCALE_FACTOR).round();
    counts.clamp(0.0, 65534.0) as u16 as i16
}

/// Row-major grid where each cell is `col * 1000 + row`.
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid_layout() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[1], 1000.0);
        assert_eq!(grid[10], 1.0);
    }

    #[test]
    fn test_pack_roundtrip_within_quantum() {
        for kelvin in [200.0f32, 250.5, 300.25, 329.9] {
            let raw = pack(kelvin);
            let back = raw as u16 as f32 * BT_SCALE_FACTOR + BT_ADD_OFFSET;
            assert!((back - kelvin).abs() <= BT_SCALE_FACTOR / 2.0 + 1e-3);
        }
    }

    #[test]
    fn test_off_disk_pixels_are_fill() {
        let scene = SyntheticScene::from_field(Geostationary::goes16_full_disk_decimated(64), kelvin_field);
        // Corners of a full-disk scene look into space.
        assert_eq!(scene.raw_at(0, 0), BT_FILL);
        assert!(scene.expected_kelvin(0, 0).is_none());

        let centre = scene.projection.nx / 2;
        let value = scene.expected_kelvin(centre, centre).unwrap();
        assert!((200.0..330.0).contains(&value), "centre value {}", value);
    }

    #[test]
    fn test_uniform_scene_has_no_fill() {
        let scene = SyntheticScene::uniform(8, 6, 280.0);
        assert_eq!(scene.raw.len(), 48);
        assert!(scene.raw.iter().all(|&r| r != BT_FILL));
    }
}
