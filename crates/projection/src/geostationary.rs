//! Geostationary satellite projection.
//!
//! GOES-R ABI imagery is laid out on a fixed grid of scan angles (radians)
//! seen from a satellite parked above the equator. The forward and inverse
//! transforms follow the GOES-R Product Definition and Users' Guide (PUG),
//! Volume 4, Section 4.2.8.

/// Geostationary projection plus the fixed-grid geotransform of one scene.
///
/// Grid indices address pixel centres: column `i` sits at scan angle
/// `x_origin + i * dx`, row `j` at `y_origin + j * dy`.
#[derive(Debug, Clone, PartialEq)]
pub struct Geostationary {
    /// Satellite distance from Earth centre (meters): perspective height + semi-major axis.
    pub h: f64,
    /// Perspective point height above the ellipsoid (meters)
    pub perspective_point_height: f64,
    /// Semi-major axis (meters)
    pub req: f64,
    /// Semi-minor axis (meters)
    pub rpol: f64,
    /// Longitude of the sub-satellite point (radians)
    pub lambda_0: f64,
    /// Sweep angle axis is x (GOES-R) rather than y (Meteosat).
    pub sweep_x: bool,
    /// Scan angle of the first column centre (radians)
    pub x_origin: f64,
    /// Scan angle of the first row centre (radians)
    pub y_origin: f64,
    /// Column step (radians, positive eastward)
    pub dx: f64,
    /// Row step (radians, negative southward)
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
}

/// GRS80 ellipsoid and nominal GOES-East position, as stored in ABI files.
pub const GOES_PERSPECTIVE_HEIGHT: f64 = 35_786_023.0;
pub const GRS80_SEMI_MAJOR: f64 = 6_378_137.0;
pub const GRS80_SEMI_MINOR: f64 = 6_356_752.31414;
pub const GOES16_LONGITUDE: f64 = -75.0;

/// Full-disk scan angle of the first pixel centre at 2 km resolution.
const FULL_DISK_EDGE: f64 = 0.151844;
/// 2 km ABI pixel pitch in radians.
const FULL_DISK_STEP_2KM: f64 = 0.000056;

impl Geostationary {
    /// Build from the `goes_imager_projection` attributes and the `x`/`y`
    /// coordinate layout of an ABI file.
    #[allow(clippy::too_many_arguments)]
    pub fn from_goes(
        perspective_point_height: f64,
        semi_major_axis: f64,
        semi_minor_axis: f64,
        longitude_origin_deg: f64,
        x_origin: f64,
        y_origin: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Self {
        Self {
            h: perspective_point_height + semi_major_axis,
            perspective_point_height,
            req: semi_major_axis,
            rpol: semi_minor_axis,
            lambda_0: longitude_origin_deg.to_radians(),
            sweep_x: true,
            x_origin,
            y_origin,
            dx,
            dy,
            nx,
            ny,
        }
    }

    /// GOES-16 full disk at 2 km (channels 7-16), 5424 x 5424 pixels.
    pub fn goes16_full_disk() -> Self {
        Self::goes16_full_disk_decimated(1)
    }

    /// GOES-16 full disk sampled every `factor` pixels.
    ///
    /// Covers the same angular range as the 2 km grid with fewer pixels,
    /// which keeps synthetic scenes small.
    pub fn goes16_full_disk_decimated(factor: usize) -> Self {
        let factor = factor.max(1);
        let step = FULL_DISK_STEP_2KM * factor as f64;
        let n = (5424 - 1) / factor + 1;
        Self::from_goes(
            GOES_PERSPECTIVE_HEIGHT,
            GRS80_SEMI_MAJOR,
            GRS80_SEMI_MINOR,
            GOES16_LONGITUDE,
            -FULL_DISK_EDGE,
            FULL_DISK_EDGE,
            step,
            -step,
            n,
            n,
        )
    }

    /// Longitude of the sub-satellite point in degrees.
    pub fn longitude_origin_deg(&self) -> f64 {
        self.lambda_0.to_degrees()
    }

    /// Grid indices to scan angles.
    #[inline]
    pub fn grid_to_scan(&self, i: f64, j: f64) -> (f64, f64) {
        (self.x_origin + i * self.dx, self.y_origin + j * self.dy)
    }

    /// Scan angles to fractional grid indices.
    #[inline]
    pub fn scan_to_grid(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.x_origin) / self.dx, (y - self.y_origin) / self.dy)
    }

    /// Scan angles (radians) to `(lon, lat)` in degrees.
    ///
    /// Returns None when the line of sight misses the Earth.
    pub fn scan_to_geo(&self, x_rad: f64, y_rad: f64) -> Option<(f64, f64)> {
        let (sin_x, cos_x) = x_rad.sin_cos();
        let (sin_y, cos_y) = y_rad.sin_cos();
        let axis_ratio2 = (self.req / self.rpol).powi(2);

        let a = sin_x.powi(2) + cos_x.powi(2) * (cos_y.powi(2) + axis_ratio2 * sin_y.powi(2));
        let b = -2.0 * self.h * cos_x * cos_y;
        let c = self.h.powi(2) - self.req.powi(2);

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let rs = (-b - discriminant.sqrt()) / (2.0 * a);
        let sx = rs * cos_x * cos_y;
        let sy = -rs * sin_x;
        let sz = rs * cos_x * sin_y;

        let lat = (axis_ratio2 * sz / (self.h - sx).hypot(sy)).atan();
        let lon = self.lambda_0 - sy.atan2(self.h - sx);

        Some((normalize_lon(lon.to_degrees()), lat.to_degrees()))
    }

    /// `(lon, lat)` in degrees to scan angles (radians).
    ///
    /// Returns None when the point is on the far side of the limb.
    pub fn geo_to_scan(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let lat = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - self.lambda_0;

        let axis_ratio2 = (self.rpol / self.req).powi(2);
        let phi_c = (axis_ratio2 * lat.tan()).atan();
        let e2 = 1.0 - axis_ratio2;
        let rc = self.rpol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        let sx = self.h - rc * phi_c.cos() * dlon.cos();
        let sy = -rc * phi_c.cos() * dlon.sin();
        let sz = rc * phi_c.sin();

        // Visible only if the satellite sees the surface point in front of the limb.
        if self.h * (self.h - sx) < sy * sy + (self.req / self.rpol).powi(2) * sz * sz {
            return None;
        }

        let range = (sx * sx + sy * sy + sz * sz).sqrt();
        let x = (-sy / range).asin();
        let y = (sz / sx).atan();
        Some((x, y))
    }

    /// `(lon, lat)` to fractional `(column, row)` on the fixed grid.
    pub fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let (x, y) = self.geo_to_scan(lon_deg, lat_deg)?;
        Some(self.scan_to_grid(x, y))
    }

    /// `(column, row)` to `(lon, lat)`, None when the pixel looks into space.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> Option<(f64, f64)> {
        let (x, y) = self.grid_to_scan(i, j);
        self.scan_to_geo(x, y)
    }

    /// Whether two descriptors describe the same fixed grid.
    ///
    /// Scan-angle layout is compared to `1e-9` radians, the ellipsoid and
    /// satellite height to `1e-6` relative.
    pub fn same_grid(&self, other: &Self) -> bool {
        const ANGLE_TOL: f64 = 1e-9;
        let rel = |a: f64, b: f64| (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0);

        self.nx == other.nx
            && self.ny == other.ny
            && self.sweep_x == other.sweep_x
            && rel(self.h, other.h)
            && rel(self.req, other.req)
            && rel(self.rpol, other.rpol)
            && (self.lambda_0 - other.lambda_0).abs() <= ANGLE_TOL
            && (self.x_origin - other.x_origin).abs() <= ANGLE_TOL
            && (self.y_origin - other.y_origin).abs() <= ANGLE_TOL
            && (self.dx - other.dx).abs() <= ANGLE_TOL
            && (self.dy - other.dy).abs() <= ANGLE_TOL
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

fn normalize_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nadir_is_sub_satellite_point() {
        let proj = Geostationary::goes16_full_disk();
        let (lon, lat) = proj.scan_to_geo(0.0, 0.0).unwrap();
        assert!((lon - -75.0).abs() < 1e-9, "nadir lon {}", lon);
        assert!(lat.abs() < 1e-9, "nadir lat {}", lat);

        let (x, y) = proj.geo_to_scan(-75.0, 0.0).unwrap();
        assert!(x.abs() < 1e-12 && y.abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip_off_axis() {
        let proj = Geostationary::goes16_full_disk();

        // Southern Brazil, well away from both scan axes.
        for &(lon, lat) in &[(-47.5, -35.0), (-60.0, -25.0), (-100.0, 40.0), (-20.0, 10.0)] {
            let (x, y) = proj.geo_to_scan(lon, lat).unwrap();
            let (lon2, lat2) = proj.scan_to_geo(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-7, "lon {} -> {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-7, "lat {} -> {}", lat, lat2);
        }
    }

    #[test]
    fn test_known_scan_angles() {
        // Values from the PUG worked example (33.846162 N, 84.690932 W).
        let proj = Geostationary::goes16_full_disk();
        let (x, y) = proj.geo_to_scan(-84.690932, 33.846162).unwrap();
        assert!((x - -0.024052).abs() < 1e-6, "x = {}", x);
        assert!((y - 0.095340).abs() < 1e-6, "y = {}", y);
    }

    #[test]
    fn test_far_side_not_visible() {
        let proj = Geostationary::goes16_full_disk();
        assert!(proj.geo_to_scan(105.0, 0.0).is_none());
        assert!(proj.geo_to_scan(-75.0, 89.0).is_none());
        assert!(proj.scan_to_geo(0.2, 0.2).is_none());
    }

    #[test]
    fn test_full_disk_layout() {
        let proj = Geostationary::goes16_full_disk();
        assert_eq!(proj.dimensions(), (5424, 5424));

        let (i, j) = proj.geo_to_grid(-75.0, 0.0).unwrap();
        assert!((i - 2711.5).abs() < 0.01, "i = {}", i);
        assert!((j - 2711.5).abs() < 0.01, "j = {}", j);
    }

    #[test]
    fn test_decimated_grid_covers_same_angles() {
        let full = Geostationary::goes16_full_disk();
        let coarse = Geostationary::goes16_full_disk_decimated(8);
        assert_eq!(coarse.nx, 678);

        let (x_last, _) = coarse.grid_to_scan((coarse.nx - 1) as f64, 0.0);
        let (x_full, _) = full.grid_to_scan((full.nx - 1) as f64, 0.0);
        assert!((x_last - x_full).abs() <= full.dx * 8.0);
    }

    #[test]
    fn test_same_grid() {
        let a = Geostationary::goes16_full_disk();
        let mut b = a.clone();
        assert!(a.same_grid(&b));

        b.x_origin += 1e-6;
        assert!(!a.same_grid(&b));

        let c = Geostationary::goes16_full_disk_decimated(2);
        assert!(!a.same_grid(&c));
    }
}
