//! GOES-16 product pipeline.
//!
//! Fetches ABI scenes from the public archive, calibrates and optionally
//! differences them, reprojects to a lon/lat grid and renders a map:
//!
//! ```text
//! goes-fog --product btd-fog --time 202107071000 --extent=-60,-35,-45,-25
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use goes_common::{Extent, ScanTime};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use goes_fog::config::{find_product, load_product_configs};
use goes_fog::{Pipeline, PipelineOutcome, ProductRequest};
use renderer::{MapRenderer, RenderAssets};
use storage::SceneStore;

#[derive(Parser, Debug)]
#[command(name = "goes-fog")]
#[command(about = "Render GOES-16 channel imagery and night fog products")]
struct Args {
    /// Product id from config/products/*.yaml
    #[arg(short, long, env = "GOES_PRODUCT", default_value = "btd-fog")]
    product: String,

    /// Scan start times, YYYYMMDDHHMM (UTC); processed one after another
    #[arg(short, long, num_args = 1.., default_value = "202107071000")]
    time: Vec<ScanTime>,

    /// Region as min_lon,max_lon,min_lat,max_lat (product default if omitted)
    #[arg(short, long, allow_hyphen_values = true)]
    extent: Option<Extent>,

    /// Directory for downloaded scenes
    #[arg(long, default_value = "input")]
    input_dir: PathBuf,

    /// Directory for reprojected grids and images
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Configuration directory (contains products/*.yaml)
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Map overlays (boundaries, coastline, places)
    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    /// TrueType font for map text; the bundled and system fonts are tried after it
    #[arg(long, env = "GOES_FONT")]
    font: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = fmt().with_env_filter(filter).with_target(true);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(product = %args.product, times = args.time.len(), "Starting GOES pipeline");

    let configs = load_product_configs(&args.config_dir)?;
    let product = find_product(&configs, &args.product)?;

    let store = SceneStore::new(&product.source).context("Failed to create archive client")?;
    let assets = RenderAssets::in_dir(&args.assets_dir, args.font.as_deref());
    let renderer = MapRenderer::load(&assets).context("Failed to load map assets")?;
    let pipeline = Pipeline::new(store, renderer);

    let requests = ProductRequest::batch(
        product,
        &args.time,
        args.extent,
        args.input_dir.clone(),
        args.output_dir.clone(),
    );

    let (mut rendered, mut missing, mut failed) = (0usize, 0usize, 0usize);
    for request in &requests {
        match pipeline.run(product, request).await {
            Ok(PipelineOutcome::Rendered { name, image, .. }) => {
                info!(time = %request.time, name = %name, image = %image.display(), "Rendered");
                rendered += 1;
            }
            Ok(PipelineOutcome::SceneMissing { channel, prefix }) => {
                warn!(time = %request.time, channel = %channel, prefix = %prefix, "No scene published");
                missing += 1;
            }
            Err(e) => {
                error!(time = %request.time, error = ?e, "Request failed");
                failed += 1;
            }
        }
    }

    info!(rendered, missing, failed, "Finished");
    if failed > 0 {
        bail!("{} of {} requests failed", failed, requests.len());
    }
    Ok(())
}
