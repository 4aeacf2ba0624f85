//! Fixed-grid geostationary projection for GOES-R ABI imagery.
//!
//! Implements the projection math directly, without external dependencies.

pub mod geostationary;

pub use geostationary::Geostationary;
