//! Structured product requests.

use std::path::PathBuf;

use goes_common::{Extent, ScanTime};

use crate::config::ProductConfig;

/// One product at one scan time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRequest {
    pub product: String,
    pub time: ScanTime,
    pub extent: Extent,
    /// Where scene files are cached
    pub input_dir: PathBuf,
    /// Where grids and images are written
    pub output_dir: PathBuf,
}

impl ProductRequest {
    /// A request per scan time, sharing the product, extent and directories.
    /// The product's default extent is used when `extent` is `None`.
    pub fn batch(
        product: &ProductConfig,
        times: &[ScanTime],
        extent: Option<Extent>,
        input_dir: PathBuf,
        output_dir: PathBuf,
    ) -> Vec<Self> {
        let extent = extent.unwrap_or(product.processing.extent);
        times
            .iter()
            .map(|&time| Self {
                product: product.product.id.clone(),
                time,
                extent,
                input_dir: input_dir.clone(),
                output_dir: output_dir.clone(),
            })
            .collect()
    }
}
