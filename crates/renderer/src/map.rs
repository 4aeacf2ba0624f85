//! Map frame geometry and line work.

use goes_common::Extent;
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::colormap::Colormap;
use crate::overlay::LineSet;

/// Spacing of graticule lines in degrees.
pub const GRIDLINE_SPACING: f64 = 5.0;

/// Pixel rectangle showing `extent` in plate carrée.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub extent: Extent,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl MapFrame {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Pixel position of a lon/lat point (may lie outside the frame).
    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let x = (lon - self.extent.min_lon) / self.extent.width();
        let y = (self.extent.max_lat - lat) / self.extent.height();
        (
            self.left + x as f32 * self.width,
            self.top + y as f32 * self.height,
        )
    }

    /// Clip a pixel segment to the frame (Liang-Barsky).
    pub fn clip(&self, (x0, y0): (f32, f32), (x1, y1): (f32, f32)) -> Option<((f32, f32), (f32, f32))> {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;

        for (p, q) in [
            (-dx, x0 - self.left),
            (dx, self.right() - x0),
            (-dy, y0 - self.top),
            (dy, self.bottom() - y0),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((
            (x0 + t0 * dx, y0 + t0 * dy),
            (x0 + t1 * dx, y0 + t1 * dy),
        ))
    }
}

/// Draw a segment `thickness` pixels wide.
pub fn draw_thick_segment(
    image: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: u32,
    color: Rgba<u8>,
) {
    let half = thickness as f32 / 2.0;
    let steep = (end.1 - start.1).abs() > (end.0 - start.0).abs();
    for k in 0..thickness.max(1) {
        let offset = k as f32 - half + 0.5;
        let (s, e) = if steep {
            ((start.0 + offset, start.1), (end.0 + offset, end.1))
        } else {
            ((start.0, start.1 + offset), (end.0, end.1 + offset))
        };
        draw_line_segment_mut(image, s, e, color);
    }
}

/// Draw every polyline of `lines`, clipped to the frame.
pub fn draw_lines(image: &mut RgbaImage, frame: &MapFrame, lines: &LineSet, thickness: u32, color: Rgba<u8>) {
    for line in &lines.lines {
        for pair in line.windows(2) {
            let a = frame.project(pair[0].0, pair[0].1);
            let b = frame.project(pair[1].0, pair[1].1);
            if let Some((a, b)) = frame.clip(a, b) {
                draw_thick_segment(image, a, b, thickness, color);
            }
        }
    }
}

/// Dashed segment with `dash` pixels on and `gap` pixels off.
pub fn draw_dashed_segment(
    image: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    (dash, gap): (f32, f32),
    thickness: u32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);

    let mut along = 0.0;
    while along < length {
        let stop = (along + dash).min(length);
        draw_thick_segment(
            image,
            (start.0 + ux * along, start.1 + uy * along),
            (start.0 + ux * stop, start.1 + uy * stop),
            thickness,
            color,
        );
        along += dash + gap;
    }
}

/// Multiples of `spacing` inside `[min, max]`.
pub fn gridline_values(min: f64, max: f64, spacing: f64) -> Vec<f64> {
    let first = (min / spacing).ceil() as i64;
    let last = (max / spacing).floor() as i64;
    (first..=last).map(|k| k as f64 * spacing).collect()
}

fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let magnitude = value.abs();
    let number = if (magnitude - magnitude.round()).abs() < 1e-9 {
        format!("{}", magnitude.round() as i64)
    } else {
        let s = format!("{:.2}", magnitude);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    };

    if magnitude < 1e-9 {
        "0°".to_string()
    } else if value < 0.0 {
        format!("{}°{}", number, negative)
    } else {
        format!("{}°{}", number, positive)
    }
}

/// `50°W`, `0°`, `10°E`
pub fn format_longitude(lon: f64) -> String {
    format_degrees(lon, 'E', 'W')
}

/// `30°S`, `0°`, `10°N`
pub fn format_latitude(lat: f64) -> String {
    format_degrees(lat, 'N', 'S')
}

/// Round tick positions (1, 2, 2.5, 5 times a power of ten) inside
/// `[min, max]`, at most about `max_ticks` of them.
pub fn nice_ticks(min: f32, max: f32, max_ticks: usize) -> Vec<f32> {
    let range = (max - min) as f64;
    if !(range.is_finite() && range > 0.0) || max_ticks < 2 {
        return vec![min];
    }

    let raw = range / (max_ticks - 1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min as f64 / step).ceil() as i64;
    let last = (max as f64 / step + 1e-9).floor() as i64;
    (first..=last).map(|k| (k as f64 * step) as f32).collect()
}

/// Tick label without trailing zeros.
pub fn format_tick(value: f32) -> String {
    if (value - value.round()).abs() < 1e-4 {
        format!("{}", value.round() as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Fill `(left, top, width, height)` with the colormap, low values on the
/// left, and outline it.
pub fn draw_colorbar(
    image: &mut RgbaImage,
    (left, top, width, height): (u32, u32, u32, u32),
    colormap: Colormap,
    outline: Rgba<u8>,
) {
    let span = width.saturating_sub(1).max(1) as f32;
    for dx in 0..width {
        let color = colormap.color(dx as f32 / span).to_rgba();
        for dy in 0..height {
            let (x, y) = (left + dx, top + dy);
            if x < image.width() && y < image.height() {
                image.put_pixel(x, y, color);
            }
        }
    }

    let (l, t) = (left as f32, top as f32);
    let (r, b) = ((left + width) as f32 - 1.0, (top + height) as f32 - 1.0);
    for (a, z) in [((l, t), (r, t)), ((r, t), (r, b)), ((r, b), (l, b)), ((l, b), (l, t))] {
        draw_line_segment_mut(image, a, z, outline);
    }
}

/// Trim the uniform `background` border. An image that is all background is
/// returned unchanged.
pub fn crop_to_content(image: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);

    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel != background {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if min_x == u32::MAX {
        return image.clone();
    }
    imageops::crop_imm(image, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> MapFrame {
        MapFrame {
            extent: Extent::new(-60.0, -35.0, -45.0, -25.0).unwrap(),
            left: 100.0,
            top: 50.0,
            width: 1250.0,
            height: 1000.0,
        }
    }

    #[test]
    fn test_project_corners() {
        let f = frame();
        assert_eq!(f.project(-60.0, -25.0), (100.0, 50.0));
        assert_eq!(f.project(-35.0, -45.0), (1350.0, 1050.0));
    }

    #[test]
    fn test_clip_segment() {
        let f = frame();
        let (a, b) = f.clip((0.0, 100.0), (2000.0, 100.0)).unwrap();
        assert_eq!(a, (100.0, 100.0));
        assert_eq!(b, (1350.0, 100.0));
        assert!(f.clip((0.0, 0.0), (50.0, 10.0)).is_none());
    }

    #[test]
    fn test_gridline_values() {
        assert_eq!(gridline_values(-60.0, -35.0, 5.0), vec![-60.0, -55.0, -50.0, -45.0, -40.0, -35.0]);
        assert_eq!(gridline_values(-44.0, -26.0, 5.0), vec![-40.0, -35.0, -30.0]);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(-5.0, 5.0, 6), vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
        assert_eq!(nice_ticks(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(nice_ticks(2.0, 2.0, 5), vec![2.0]);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(-4.0), "-4");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(2.5), "2.5");
    }
}
