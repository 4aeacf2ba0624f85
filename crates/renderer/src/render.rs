//! Composition of the annotated map image.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use goes_common::{Extent, GeographicGrid};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use netcdf_parser::read_geographic_grid;
use rusttype::{Font, Scale};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::colormap::{colorize, Color, Colormap};
use crate::error::RenderResult;
use crate::map::{
    crop_to_content, draw_colorbar, draw_dashed_segment, draw_lines, draw_thick_segment, format_latitude,
    format_longitude, format_tick, gridline_values, nice_ticks, MapFrame, GRIDLINE_SPACING,
};
use crate::overlay::{load_places, LineSet, Place};
use crate::png::{write_png, DEFAULT_DPI};
use crate::text::{draw_aligned, font_candidates, load_font, text_size, Align};

/// Length of the map's long side in pixels.
const MAP_SIZE: u32 = 2000;
const MARGIN_LEFT: u32 = 170;
const MARGIN_TOP: u32 = 110;
const MARGIN_RIGHT: u32 = 60;
const TITLE_SIZE: f32 = 40.0;
const LABEL_SIZE: f32 = 32.0;
const COLORBAR_GAP: u32 = 90;
const COLORBAR_HEIGHT: u32 = 40;
const MAX_COLORBAR_TICKS: usize = 7;
const MIN_COLORBAR_WIDTH: u32 = 600;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BOUNDARY: Rgba<u8> = Rgba([40, 40, 40, 255]);
const GRIDLINE: Rgba<u8> = Rgba([128, 128, 128, 255]);
const PLACE: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// How one product is displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub colormap: Colormap,
    /// Colorbar label
    pub label: String,
    /// Band or product label used in the title, e.g. `BTD`
    pub band: String,
    /// Fixed lower bound; auto-scaled when absent
    #[serde(default)]
    pub vmin: Option<f32>,
    /// Fixed upper bound; auto-scaled when absent
    #[serde(default)]
    pub vmax: Option<f32>,
}

impl RenderConfig {
    /// Display range: configured bounds, else the finite data range.
    pub fn value_range(&self, grid: &GeographicGrid) -> (f32, f32) {
        let auto = grid.valid_range();
        match (self.vmin, self.vmax, auto) {
            (Some(lo), Some(hi), _) => (lo, hi),
            (lo, hi, Some((data_lo, data_hi))) => (lo.unwrap_or(data_lo), hi.unwrap_or(data_hi)),
            (lo, hi, None) => {
                warn!("No valid data to auto-scale; using a unit range");
                let lo = lo.unwrap_or(0.0);
                (lo, hi.unwrap_or(lo + 1.0))
            }
        }
    }
}

/// `GOES-16 BTD 2021-07-07 10:00 UTC`
pub fn left_title(band: &str, acquired: DateTime<Utc>) -> String {
    format!("GOES-16 {} {}", band, acquired.format("%Y-%m-%d %H:%M UTC"))
}

/// `Reg.: [-60.0, -35.0, -45.0, -25.0]`
pub fn right_title(extent: &Extent) -> String {
    format!("Reg.: {}", extent)
}

/// Overlay and font locations.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderAssets {
    pub boundaries: PathBuf,
    pub coastline: PathBuf,
    pub places: PathBuf,
    /// Fonts tried in order. Empty disables text; otherwise one must load.
    pub fonts: Vec<PathBuf>,
}

impl RenderAssets {
    /// Standard asset names under `dir`. Fonts are the configured one, the
    /// bundled one, then system fallbacks.
    pub fn in_dir(dir: &Path, font: Option<&Path>) -> Self {
        Self {
            boundaries: dir.join("boundaries.geojson"),
            coastline: dir.join("coastline.geojson"),
            places: dir.join("places.csv"),
            fonts: font_candidates(font, dir),
        }
    }
}

/// Loaded overlays, ready to render any number of maps.
pub struct MapRenderer {
    boundaries: LineSet,
    coastline: LineSet,
    places: Vec<Place>,
    font: Option<Font<'static>>,
}

impl MapRenderer {
    /// Load all assets. A missing overlay or font is an error.
    pub fn load(assets: &RenderAssets) -> RenderResult<Self> {
        Ok(Self {
            boundaries: LineSet::load(&assets.boundaries)?,
            coastline: LineSet::load(&assets.coastline)?,
            places: load_places(&assets.places)?,
            font: load_font(&assets.fonts)?,
        })
    }

    pub fn has_text(&self) -> bool {
        self.font.is_some()
    }

    /// Render the reprojected grid at `grid_path` to `<target_stem>.png`.
    #[instrument(skip_all, fields(grid = %grid_path.display(), band = %config.band))]
    pub fn render_to_file(
        &self,
        grid_path: &Path,
        extent: &Extent,
        acquired: DateTime<Utc>,
        config: &RenderConfig,
        target_stem: &Path,
    ) -> RenderResult<PathBuf> {
        let grid = read_geographic_grid(grid_path)?;
        let image = self.render(&grid, extent, acquired, config);

        let path = png_path(target_stem);
        write_png(&path, &image, Some(DEFAULT_DPI))?;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Rendered map"
        );
        Ok(path)
    }

    /// Compose the full map and crop it to its content.
    pub fn render(
        &self,
        grid: &GeographicGrid,
        extent: &Extent,
        acquired: DateTime<Utc>,
        config: &RenderConfig,
    ) -> RgbaImage {
        let (map_width, map_height) = map_size(extent);
        let bar_width = (map_width * 4 / 5).max(MIN_COLORBAR_WIDTH);
        let content_width = map_width.max(bar_width);

        let colorbar_top = MARGIN_TOP + map_height + COLORBAR_GAP;
        let canvas_width = MARGIN_LEFT + content_width + MARGIN_RIGHT;
        let canvas_height = colorbar_top + COLORBAR_HEIGHT + 130;
        let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, BACKGROUND);

        let frame = MapFrame {
            extent: *extent,
            left: MARGIN_LEFT as f32,
            top: MARGIN_TOP as f32,
            width: map_width as f32,
            height: map_height as f32,
        };

        let range = config.value_range(grid);
        let raster = colorize(
            grid,
            extent,
            config.colormap,
            range,
            (map_width, map_height),
            Color::rgb(255, 255, 255),
        );
        imageops::overlay(&mut canvas, &raster, MARGIN_LEFT as i64, MARGIN_TOP as i64);

        draw_lines(&mut canvas, &frame, &self.boundaries, 1, BOUNDARY);
        draw_lines(&mut canvas, &frame, &self.coastline, 2, INK);
        self.draw_gridlines(&mut canvas, &frame);
        self.draw_places(&mut canvas, &frame);
        self.draw_frame(&mut canvas, &frame);

        let bar_left = MARGIN_LEFT + map_width.saturating_sub(bar_width) / 2;
        draw_colorbar(
            &mut canvas,
            (bar_left, colorbar_top, bar_width, COLORBAR_HEIGHT),
            config.colormap,
            INK,
        );
        self.draw_colorbar_labels(&mut canvas, (bar_left, colorbar_top, bar_width), range, &config.label);

        if let Some(font) = &self.font {
            let scale = Scale::uniform(TITLE_SIZE);
            let y = MARGIN_TOP as i32 - TITLE_SIZE as i32 - 16;
            draw_aligned(
                &mut canvas,
                font,
                scale,
                INK,
                (frame.left as i32, y),
                Align::Left,
                &left_title(&config.band, acquired),
            );
            draw_aligned(
                &mut canvas,
                font,
                scale,
                INK,
                ((MARGIN_LEFT + content_width) as i32, y),
                Align::Right,
                &right_title(extent),
            );
        }

        crop_to_content(&canvas, BACKGROUND)
    }

    fn draw_frame(&self, canvas: &mut RgbaImage, frame: &MapFrame) {
        let (l, t, r, b) = (frame.left, frame.top, frame.right() - 1.0, frame.bottom() - 1.0);
        for (a, z) in [((l, t), (r, t)), ((r, t), (r, b)), ((r, b), (l, b)), ((l, b), (l, t))] {
            draw_thick_segment(canvas, a, z, 2, INK);
        }
    }

    /// Dashed graticule, labelled on the left and bottom edges only.
    fn draw_gridlines(&self, canvas: &mut RgbaImage, frame: &MapFrame) {
        let extent = frame.extent;
        let scale = Scale::uniform(LABEL_SIZE);
        let dash = (12.0, 8.0);

        for lon in gridline_values(extent.min_lon, extent.max_lon, GRIDLINE_SPACING) {
            let (x, _) = frame.project(lon, extent.max_lat);
            draw_dashed_segment(canvas, (x, frame.top), (x, frame.bottom()), dash, 1, GRIDLINE);
            if let Some(font) = &self.font {
                let label = format_longitude(lon);
                draw_aligned(
                    canvas,
                    font,
                    scale,
                    INK,
                    (x as i32, frame.bottom() as i32 + 10),
                    Align::Center,
                    &label,
                );
            }
        }

        for lat in gridline_values(extent.min_lat, extent.max_lat, GRIDLINE_SPACING) {
            let (_, y) = frame.project(extent.min_lon, lat);
            draw_dashed_segment(canvas, (frame.left, y), (frame.right(), y), dash, 1, GRIDLINE);
            if let Some(font) = &self.font {
                let label = format_latitude(lat);
                let (_, h) = text_size(font, scale, &label);
                draw_aligned(
                    canvas,
                    font,
                    scale,
                    INK,
                    (frame.left as i32 - 12, y as i32 - h / 2),
                    Align::Right,
                    &label,
                );
            }
        }
    }

    fn draw_places(&self, canvas: &mut RgbaImage, frame: &MapFrame) {
        let scale = Scale::uniform(LABEL_SIZE * 0.8);
        for place in &self.places {
            if !frame.extent.contains(place.lon, place.lat) {
                continue;
            }
            let (x, y) = frame.project(place.lon, place.lat);
            draw_filled_circle_mut(canvas, (x as i32, y as i32), 5, PLACE);
            if let Some(font) = &self.font {
                let (_, h) = text_size(font, scale, &place.id);
                draw_aligned(canvas, font, scale, PLACE, (x as i32 + 9, y as i32 - h / 2), Align::Left, &place.id);
            }
        }
    }

    fn draw_colorbar_labels(
        &self,
        canvas: &mut RgbaImage,
        (left, top, width): (u32, u32, u32),
        (vmin, vmax): (f32, f32),
        label: &str,
    ) {
        let bottom = (top + COLORBAR_HEIGHT) as f32;
        let span = vmax - vmin;
        let scale = Scale::uniform(LABEL_SIZE);

        for tick in nice_ticks(vmin, vmax, MAX_COLORBAR_TICKS) {
            let t = if span.abs() > 0.0 { (tick - vmin) / span } else { 0.0 };
            let x = left as f32 + t * (width.saturating_sub(1)) as f32;
            draw_thick_segment(canvas, (x, bottom), (x, bottom + 10.0), 2, INK);
            if let Some(font) = &self.font {
                draw_aligned(
                    canvas,
                    font,
                    scale,
                    INK,
                    (x as i32, bottom as i32 + 14),
                    Align::Center,
                    &format_tick(tick),
                );
            }
        }

        if let Some(font) = &self.font {
            draw_aligned(
                canvas,
                font,
                scale,
                INK,
                ((left + width / 2) as i32, bottom as i32 + 14 + LABEL_SIZE as i32 + 12),
                Align::Center,
                label,
            );
        }
    }
}

/// Map area in pixels: the long side of the extent gets [`MAP_SIZE`], the
/// other side keeps the aspect ratio.
pub fn map_size(extent: &Extent) -> (u32, u32) {
    let (w, h) = (extent.width(), extent.height());
    let short = |ratio: f64| ((MAP_SIZE as f64 * ratio).round() as u32).clamp(1, MAP_SIZE);
    if w >= h {
        (MAP_SIZE, short(h / w))
    } else {
        (short(w / h), MAP_SIZE)
    }
}

/// `<target_stem>.png`
pub fn png_path(target_stem: &Path) -> PathBuf {
    let mut name = target_stem
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".png");
    target_stem.with_file_name(name)
}
