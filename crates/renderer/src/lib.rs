//! Map rendering for reprojected GOES grids.
//!
//! - [`colormap`]: value-to-colour ramps (`gray`, `gray_r`, `Greys`, `viridis`, `jet`)
//! - [`overlay`]: GeoJSON boundary/coastline lines and the place table
//! - [`map`]: frame geometry, gridlines, colorbar and tight cropping
//! - [`render`]: composes everything into a titled map image
//! - [`png`]: PNG encoder with physical pixel density

pub mod colormap;
pub mod error;
pub mod map;
pub mod overlay;
pub mod png;
pub mod render;
pub mod text;

pub use colormap::{Color, Colormap};
pub use error::{RenderError, RenderResult};
pub use render::{MapRenderer, RenderAssets, RenderConfig};
