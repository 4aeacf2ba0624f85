//! Stage orchestration: fetch, calibrate, combine, reproject, render.

use std::path::PathBuf;

use anyhow::{Context, Result};
use goes_common::Channel;
use grid_processor::{difference, reproject_to_file};
use netcdf_parser::{read_scene, Scene};
use renderer::MapRenderer;
use storage::{FetchOutcome, Fetcher, SceneStore};
use tracing::{info, instrument, warn};

use crate::config::ProductConfig;
use crate::request::ProductRequest;

/// Result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Rendered {
        /// Output base name
        name: String,
        grid: PathBuf,
        image: PathBuf,
    },
    /// A required scene is not published; nothing downstream ran.
    SceneMissing { channel: Channel, prefix: String },
}

pub struct Pipeline {
    store: SceneStore,
    renderer: MapRenderer,
}

impl Pipeline {
    pub fn new(store: SceneStore, renderer: MapRenderer) -> Self {
        Self { store, renderer }
    }

    #[instrument(skip_all, fields(product = %product.product.id, time = %request.time))]
    pub async fn run(&self, product: &ProductConfig, request: &ProductRequest) -> Result<PipelineOutcome> {
        let processing = &product.processing;
        let fetcher = Fetcher::new(self.store.clone(), product.source.clone(), &request.input_dir);

        let mut base_names = Vec::with_capacity(processing.channels.len());
        for &channel in &processing.channels {
            match fetcher
                .fetch(request.time, channel)
                .await
                .with_context(|| format!("Failed to fetch channel {}", channel))?
            {
                FetchOutcome::Fetched(scene) => base_names.push(scene.base_name),
                FetchOutcome::NotFound { prefix } => {
                    warn!(channel = %channel, "Scene missing; skipping request");
                    return Ok(PipelineOutcome::SceneMissing { channel, prefix });
                }
            }
        }

        let mut scenes = Vec::with_capacity(base_names.len());
        for base_name in &base_names {
            let scene = read_scene(&request.input_dir, base_name, &processing.variable, processing.correction)
                .with_context(|| format!("Failed to read scene {}", base_name))?;
            scenes.push(scene);
        }

        let mut scenes = scenes.into_iter();
        let (scene, name) = match (scenes.next(), scenes.next()) {
            (Some(first), Some(second)) => {
                let combined = difference(&first, &second)
                    .with_context(|| format!("Failed to difference {} and {}", first.name, second.name))?;
                (combined, output_name(&second, &product.render.band))
            }
            (Some(only), None) => {
                let name = only.name.clone();
                (only, name)
            }
            _ => anyhow::bail!("product {} has no channels", product.product.id),
        };

        let stem = request.output_dir.join(&name);
        let reprojected = reproject_to_file(&scene, &request.extent, processing.resolution, &stem)
            .with_context(|| format!("Failed to reproject {}", name))?;

        let acquired = scene
            .acquisition_time()
            .with_context(|| format!("Invalid time_coverage_start in {}", scene.name))?;
        let image = self
            .renderer
            .render_to_file(&reprojected.path, &request.extent, acquired, &product.render, &stem)
            .with_context(|| format!("Failed to render {}", name))?;

        info!(name = %name, image = %image.display(), "Product complete");
        Ok(PipelineOutcome::Rendered {
            name,
            grid: reprojected.path,
            image,
        })
    }
}

/// Output base name of a product: the scene name, with the channel tag
/// replaced by the band label for combined products.
pub fn output_name(scene: &Scene, band: &str) -> String {
    match scene.channel() {
        Some(channel) => scene.name.replacen(&channel.tag(), band, 1),
        None => format!("{}_{}", scene.name, band),
    }
}
