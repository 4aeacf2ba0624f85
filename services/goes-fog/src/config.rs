//! Product definitions.
//!
//! Loads product configurations from YAML files in config/products/

use std::path::Path;

use anyhow::{bail, Context, Result};
use goes_common::{Channel, Extent};
use renderer::RenderConfig;
use serde::Deserialize;
use storage::ArchiveConfig;
use tracing::{debug, info, warn};

/// Root configuration loaded from a product YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub product: ProductInfo,
    #[serde(default)]
    pub source: ArchiveConfig,
    pub processing: ProcessingConfig,
    pub render: RenderConfig,
}

/// Basic product identification.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// How scenes become the product grid.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Data variable inside each scene file
    #[serde(default = "default_variable")]
    pub variable: String,
    /// One channel, or two for `first - second`
    pub channels: Vec<Channel>,
    /// Additive constant applied after calibration
    #[serde(default)]
    pub correction: f32,
    /// Output cell size in degrees
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Default region when a request gives none
    #[serde(default = "default_extent")]
    pub extent: Extent,
}

fn default_variable() -> String {
    netcdf_parser::CMI_VARIABLE.to_string()
}

fn default_resolution() -> f64 {
    grid_processor::DEFAULT_RESOLUTION
}

fn default_extent() -> Extent {
    Extent {
        min_lon: -60.0,
        max_lon: -35.0,
        min_lat: -45.0,
        max_lat: -25.0,
    }
}

impl ProductConfig {
    /// Load a product configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(product = %config.product.id, path = %path.display(), "Loaded product config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ProductConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let count = self.processing.channels.len();
        if !(1..=2).contains(&count) {
            bail!(
                "product {} lists {} channels; expected one, or two to difference",
                self.product.id,
                count
            );
        }
        if !(self.processing.resolution.is_finite() && self.processing.resolution > 0.0) {
            bail!(
                "product {} has invalid resolution {}",
                self.product.id,
                self.processing.resolution
            );
        }
        Ok(())
    }

    /// Whether the product is a difference of two channels.
    pub fn is_difference(&self) -> bool {
        self.processing.channels.len() == 2
    }
}

/// Load all enabled product configurations from `<config_dir>/products`.
pub fn load_product_configs(config_dir: &Path) -> Result<Vec<ProductConfig>> {
    let products_dir = config_dir.join("products");

    if !products_dir.exists() {
        warn!(path = %products_dir.display(), "Products config directory not found");
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = std::fs::read_dir(&products_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml"))
        .collect();
    paths.sort();

    let mut configs = Vec::new();
    for path in paths {
        match ProductConfig::load(&path) {
            Ok(config) => {
                if config.product.enabled {
                    info!(
                        product = %config.product.id,
                        name = %config.product.name,
                        "Loaded product configuration"
                    );
                    configs.push(config);
                } else {
                    debug!(product = %config.product.id, "Skipping disabled product");
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load product config");
            }
        }
    }

    info!(count = configs.len(), "Loaded product configurations");
    Ok(configs)
}

/// Find a product by id.
pub fn find_product<'a>(configs: &'a [ProductConfig], id: &str) -> Result<&'a ProductConfig> {
    match configs.iter().find(|c| c.product.id == id) {
        Some(config) => Ok(config),
        None => {
            let known: Vec<&str> = configs.iter().map(|c| c.product.id.as_str()).collect();
            bail!("unknown product '{}' (available: {})", id, known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::Colormap;

    const FOG_YAML: &str = r#"
product:
  id: btd-fog
  name: "Night fog difference"

processing:
  channels: [13, 7]

render:
  colormap: gray
  label: "Night Fog Difference"
  band: BTD
  vmin: -5
  vmax: 5
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = ProductConfig::from_yaml(FOG_YAML).unwrap();
        assert_eq!(config.product.id, "btd-fog");
        assert!(config.product.enabled);
        assert!(config.is_difference());
        assert_eq!(config.processing.variable, "CMI");
        assert_eq!(config.processing.resolution, 0.02);
        assert_eq!(config.processing.extent, default_extent());
        assert_eq!(config.source.bucket, "noaa-goes16");
        assert_eq!(config.render.colormap, Colormap::Gray);
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let yaml = FOG_YAML.replace("[13, 7]", "[13, 17]");
        assert!(ProductConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_channel_count_checked() {
        let yaml = FOG_YAML.replace("[13, 7]", "[13, 7, 8]");
        assert!(ProductConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_unknown_colormap_rejected() {
        let yaml = FOG_YAML.replace("colormap: gray", "colormap: rainbow");
        assert!(ProductConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_find_product() {
        let configs = vec![ProductConfig::from_yaml(FOG_YAML).unwrap()];
        assert!(find_product(&configs, "btd-fog").is_ok());
        let err = find_product(&configs, "nope").unwrap_err().to_string();
        assert!(err.contains("btd-fog"));
    }
}
