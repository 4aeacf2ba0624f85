//! Font loading and text placement.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};

/// Font shipped in the assets directory.
pub const BUNDLED_FONT: &str = "DejaVuSans.ttf";

/// System fonts tried after the configured and bundled ones.
pub const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// First loadable font among `candidates`.
///
/// An empty candidate list turns text off and yields `None`. A non-empty list
/// where nothing loads is an asset error.
pub fn load_font(candidates: &[PathBuf]) -> RenderResult<Option<Font<'static>>> {
    let Some(first) = candidates.first() else {
        debug!("No font candidates; text disabled");
        return Ok(None);
    };

    for path in candidates {
        match std::fs::read(path) {
            Ok(bytes) => match Font::try_from_vec(bytes) {
                Some(font) => {
                    debug!(path = %path.display(), "Loaded font");
                    return Ok(Some(font));
                }
                None => warn!(path = %path.display(), "Not a usable TrueType font"),
            },
            Err(_) => debug!(path = %path.display(), "Font not found"),
        }
    }

    Err(RenderError::asset(
        first,
        format!("no usable TrueType font among {} candidates", candidates.len()),
    ))
}

/// Configured font (if any), the bundled font under `assets_dir`, then
/// [`FALLBACK_FONTS`].
pub fn font_candidates(configured: Option<&Path>, assets_dir: &Path) -> Vec<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(std::iter::once(assets_dir.join(BUNDLED_FONT)))
        .chain(FALLBACK_FONTS.iter().map(PathBuf::from))
        .collect()
}

/// Horizontal alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Width and line height of `text` in pixels.
pub fn text_size(font: &Font, scale: Scale, text: &str) -> (i32, i32) {
    let width = font
        .layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0);
    let v_metrics = font.v_metrics(scale);
    (width.ceil() as i32, (v_metrics.ascent - v_metrics.descent).ceil() as i32)
}

/// Draw `text` with its top edge at `y`, aligned on `x`.
pub fn draw_aligned(
    image: &mut RgbaImage,
    font: &Font,
    scale: Scale,
    color: Rgba<u8>,
    (x, y): (i32, i32),
    align: Align,
    text: &str,
) {
    let (width, _) = text_size(font, scale, text);
    let left = match align {
        Align::Left => x,
        Align::Center => x - width / 2,
        Align::Right => x - width,
    };
    draw_text_mut(image, color, left, y, scale, font, text);
}
