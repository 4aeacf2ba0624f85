//! Common types and utilities shared across the GOES imagery pipeline.

pub mod channel;
pub mod error;
pub mod extent;
pub mod grid;
pub mod time;

pub use channel::{Channel, ChannelKind};
pub use error::{GoesError, GoesResult};
pub use extent::Extent;
pub use grid::{CalibratedGrid, GeographicGrid};
pub use time::{parse_coverage_start, ScanTime};
