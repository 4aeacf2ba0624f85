//! Colour ramps for scalar rasters.

use std::fmt;
use std::str::FromStr;

use goes_common::Extent;
use goes_common::GeographicGrid;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    let mix = |a: u8, b: u8| (a as f32 * t_inv + b as f32 * t).round() as u8;
    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Piecewise-linear ramp through `(position, color)` stops sorted by position.
fn ramp(stops: &[(f32, Color)], t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    for pair in stops.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t <= p1 {
            return interpolate_color(c0, c1, (t - p0) / (p1 - p0));
        }
    }
    stops[stops.len() - 1].1
}

const GREYS: [(f32, Color); 9] = [
    (0.0, Color::rgb(255, 255, 255)),
    (0.125, Color::rgb(240, 240, 240)),
    (0.25, Color::rgb(217, 217, 217)),
    (0.375, Color::rgb(189, 189, 189)),
    (0.5, Color::rgb(150, 150, 150)),
    (0.625, Color::rgb(115, 115, 115)),
    (0.75, Color::rgb(82, 82, 82)),
    (0.875, Color::rgb(37, 37, 37)),
    (1.0, Color::rgb(0, 0, 0)),
];

const VIRIDIS: [(f32, Color); 9] = [
    (0.0, Color::rgb(68, 1, 84)),
    (0.125, Color::rgb(71, 44, 122)),
    (0.25, Color::rgb(59, 81, 139)),
    (0.375, Color::rgb(44, 113, 142)),
    (0.5, Color::rgb(33, 144, 141)),
    (0.625, Color::rgb(39, 173, 129)),
    (0.75, Color::rgb(92, 200, 99)),
    (0.875, Color::rgb(170, 220, 50)),
    (1.0, Color::rgb(253, 231, 37)),
];

const JET: [(f32, Color); 6] = [
    (0.0, Color::rgb(0, 0, 128)),
    (0.125, Color::rgb(0, 0, 255)),
    (0.375, Color::rgb(0, 255, 255)),
    (0.625, Color::rgb(255, 255, 0)),
    (0.875, Color::rgb(255, 0, 0)),
    (1.0, Color::rgb(128, 0, 0)),
];

/// Named colour ramp. Low values map to the start of the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colormap {
    /// Black to white
    Gray,
    /// White to black
    GrayR,
    Greys,
    Viridis,
    Jet,
}

impl Colormap {
    pub const NAMES: [&'static str; 5] = ["gray", "gray_r", "Greys", "viridis", "jet"];

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Gray => "gray",
            Colormap::GrayR => "gray_r",
            Colormap::Greys => "Greys",
            Colormap::Viridis => "viridis",
            Colormap::Jet => "jet",
        }
    }

    /// Colour at normalized position `t` in `[0, 1]` (clamped).
    pub fn color(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        match self {
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                Color::rgb(v, v, v)
            }
            Colormap::GrayR => {
                let v = ((1.0 - t) * 255.0).round() as u8;
                Color::rgb(v, v, v)
            }
            Colormap::Greys => ramp(&GREYS, t),
            Colormap::Viridis => ramp(&VIRIDIS, t),
            Colormap::Jet => ramp(&JET, t),
        }
    }

    /// Colour of `value` scaled into `[vmin, vmax]`.
    pub fn map_value(&self, value: f32, vmin: f32, vmax: f32) -> Color {
        let range = vmax - vmin;
        let range = if range.abs() < 0.001 { 1.0 } else { range };
        self.color((value - vmin) / range)
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gray" | "grey" => Ok(Colormap::Gray),
            "gray_r" | "grey_r" => Ok(Colormap::GrayR),
            "Greys" => Ok(Colormap::Greys),
            "viridis" => Ok(Colormap::Viridis),
            "jet" => Ok(Colormap::Jet),
            other => Err(RenderError::Config(format!(
                "unknown colormap '{}', expected one of {}",
                other,
                Colormap::NAMES.join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for Colormap {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Colormap> for String {
    fn from(value: Colormap) -> Self {
        value.name().to_string()
    }
}

/// Render a geographic grid into a `width` x `height` raster covering
/// `extent`. Cells without data take `background`.
pub fn colorize(
    grid: &GeographicGrid,
    extent: &Extent,
    colormap: Colormap,
    (vmin, vmax): (f32, f32),
    (width, height): (u32, u32),
    background: Color,
) -> RgbaImage {
    let lon_step = extent.width() / width as f64;
    let lat_step = extent.height() / height as f64;
    let background = background.to_rgba();

    RgbaImage::from_fn(width, height, |x, y| {
        let lon = extent.min_lon + (x as f64 + 0.5) * lon_step;
        let lat = extent.max_lat - (y as f64 + 0.5) * lat_step;
        let value = grid.sample(lon, lat);
        if value.is_finite() {
            colormap.map_value(value, vmin, vmax).to_rgba()
        } else {
            background
        }
    })
}
