//! GOES-16 imagery pipeline.
//!
//! Runs fetch, calibration, optional band differencing, reprojection and map
//! rendering for one product definition at a time.

pub mod config;
pub mod pipeline;
pub mod request;

pub use config::{load_product_configs, ProductConfig};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use request::ProductRequest;
