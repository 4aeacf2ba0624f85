//! End-to-end runs against an in-memory archive.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use goes_common::ScanTime;
use goes_fog::config::{find_product, load_product_configs};
use goes_fog::{Pipeline, PipelineOutcome, ProductConfig, ProductRequest};
use netcdf_parser::read_geographic_grid;
use object_store::memory::InMemory;
use projection::Geostationary;
use renderer::{MapRenderer, RenderAssets};
use storage::SceneStore;
use test_utils::{
    assets_dir, fog_extent, fog_scan_time, kelvin_field, product_config_dir, sample_base_name,
    sample_object_key, temp_test_dir, SyntheticScene, MISSING_SCAN_TIME,
};

const CHANNEL7_OFFSET_K: f32 = 1.5;

fn products() -> Vec<ProductConfig> {
    let config_dir = product_config_dir();
    let root = config_dir.parent().expect("config/products has a parent");
    load_product_configs(root).unwrap()
}

fn product(id: &str) -> ProductConfig {
    find_product(&products(), id).unwrap().clone()
}

/// Archive holding channel 13 and a slightly warmer channel 7 for the
/// fixture scan.
async fn archive(scratch: &Path) -> SceneStore {
    let store = SceneStore::from_store(Arc::new(InMemory::new()), "noaa-goes16");
    let projection = Geostationary::goes16_full_disk_decimated(8);

    for (channel, offset) in [(13u8, 0.0f32), (7, CHANNEL7_OFFSET_K)] {
        let synthetic = SyntheticScene::from_field(projection.clone(), move |lon, lat| {
            kelvin_field(lon, lat) + offset
        });
        let path = scratch.join(format!("{}.nc", sample_base_name(channel)));
        synthetic.write(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        store.put(&sample_object_key(channel), Bytes::from(bytes)).await.unwrap();
    }
    store
}

fn renderer() -> MapRenderer {
    let mut assets = RenderAssets::in_dir(&assets_dir(), None);
    assets.fonts.clear();
    MapRenderer::load(&assets).unwrap()
}

fn request(product: &ProductConfig, time: ScanTime, root: &Path) -> ProductRequest {
    ProductRequest::batch(product, &[time], None, root.join("input"), root.join("output")).remove(0)
}

#[test]
fn test_bundled_products_load() {
    let configs = products();
    let ids: Vec<&str> = configs.iter().map(|c| c.product.id.as_str()).collect();
    assert_eq!(ids, vec!["band07", "btd-fog"]);

    let fog = product("btd-fog");
    assert!(fog.is_difference());
    assert_eq!(fog.processing.channels.iter().map(|c| c.number()).collect::<Vec<_>>(), vec![13, 7]);
    assert_eq!(fog.processing.extent, fog_extent());
    assert_eq!((fog.render.vmin, fog.render.vmax), (Some(-5.0), Some(5.0)));
    assert_eq!(fog.render.band, "BTD");

    let band07 = product("band07");
    assert!(!band07.is_difference());
    assert!((band07.processing.correction + 273.15).abs() < 1e-4);
    assert_eq!(band07.render.vmin, None);
}

#[tokio::test]
async fn test_fog_product_end_to_end() {
    let dir = temp_test_dir();
    let store = archive(&dir.path().join("scratch")).await;
    let pipeline = Pipeline::new(store, renderer());
    let fog = product("btd-fog");

    let outcome = pipeline
        .run(&fog, &request(&fog, fog_scan_time(), dir.path()))
        .await
        .unwrap();

    let (name, grid, image) = match outcome {
        PipelineOutcome::Rendered { name, grid, image } => (name, grid, image),
        other => panic!("expected a rendered product, got {:?}", other),
    };
    assert!(name.contains("M6BTD_G16_s20211881000"), "{}", name);
    assert!(!name.contains("C07"));
    assert_eq!(grid, dir.path().join("output").join(format!("{}_ret.nc", name)));
    assert_eq!(image, dir.path().join("output").join(format!("{}.png", name)));

    // Both scenes were cached locally.
    for channel in [13, 7] {
        let cached = dir.path().join("input").join(format!("{}.nc", sample_base_name(channel)));
        assert!(cached.exists(), "{} missing", cached.display());
    }

    let warped = read_geographic_grid(&grid).unwrap();
    assert_eq!((warped.width, warped.height), (1250, 1000));
    let valid: Vec<f32> = warped.data.iter().copied().filter(|v| v.is_finite()).collect();
    assert!(!valid.is_empty());
    // Channel 13 minus a channel 7 that is 1.5 K warmer everywhere.
    for v in valid.iter().step_by(101) {
        assert!((v + CHANNEL7_OFFSET_K).abs() < 0.05, "difference {}", v);
    }

    let png = std::fs::read(&image).unwrap();
    assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    assert!(png.windows(4).any(|w| w == b"pHYs"));
}

#[tokio::test]
async fn test_single_channel_product_keeps_scene_name() {
    let dir = temp_test_dir();
    let store = archive(&dir.path().join("scratch")).await;
    let pipeline = Pipeline::new(store, renderer());
    let band07 = product("band07");

    let outcome = pipeline
        .run(&band07, &request(&band07, fog_scan_time(), dir.path()))
        .await
        .unwrap();

    match outcome {
        PipelineOutcome::Rendered { name, grid, image } => {
            assert_eq!(name, sample_base_name(7));
            let warped = read_geographic_grid(&grid).unwrap();
            let (min, max) = warped.valid_range().unwrap();
            // Celsius after the correction.
            assert!(min > -100.0 && max < 80.0, "range {} .. {}", min, max);
            assert!(image.exists());
        }
        other => panic!("expected a rendered product, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_scene_skips_request() {
    let dir = temp_test_dir();
    let store = archive(&dir.path().join("scratch")).await;
    let pipeline = Pipeline::new(store, renderer());
    let fog = product("btd-fog");
    let time = ScanTime::parse(MISSING_SCAN_TIME).unwrap();

    let outcome = pipeline.run(&fog, &request(&fog, time, dir.path())).await.unwrap();

    match outcome {
        PipelineOutcome::SceneMissing { channel, prefix } => {
            assert_eq!(channel.number(), 13);
            assert!(prefix.ends_with("OR_ABI-L2-CMIPF-M6C13_G16_s20211881003"), "{}", prefix);
        }
        other => panic!("expected a missing scene, got {:?}", other),
    }
    assert!(!dir.path().join("output").exists());
}

#[tokio::test]
async fn test_batch_continues_past_missing_scan() {
    let dir = temp_test_dir();
    let store = archive(&dir.path().join("scratch")).await;
    let pipeline = Pipeline::new(store, renderer());
    let fog = product("btd-fog");
    let times = [ScanTime::parse(MISSING_SCAN_TIME).unwrap(), fog_scan_time()];

    let requests = ProductRequest::batch(
        &fog,
        &times,
        None,
        dir.path().join("input"),
        dir.path().join("output"),
    );
    let mut outcomes = Vec::new();
    for request in &requests {
        outcomes.push(pipeline.run(&fog, request).await.unwrap());
    }

    assert!(matches!(outcomes[0], PipelineOutcome::SceneMissing { .. }));
    assert!(matches!(outcomes[1], PipelineOutcome::Rendered { .. }));
}

#[tokio::test]
async fn test_rerun_uses_cached_scene() {
    let dir = temp_test_dir();
    let store = archive(&dir.path().join("scratch")).await;
    let pipeline = Pipeline::new(store.clone(), renderer());
    let band07 = product("band07");
    let request = request(&band07, fog_scan_time(), dir.path());

    let first = match pipeline.run(&band07, &request).await.unwrap() {
        PipelineOutcome::Rendered { grid, .. } => read_geographic_grid(&grid).unwrap(),
        other => panic!("expected a rendered product, got {:?}", other),
    };

    // Nothing left remotely: the second run can only use the local copy.
    store.delete(&sample_object_key(7)).await.unwrap();
    let second = match pipeline.run(&band07, &request).await.unwrap() {
        PipelineOutcome::Rendered { grid, .. } => read_geographic_grid(&grid).unwrap(),
        other => panic!("expected a rendered product, got {:?}", other),
    };

    assert_eq!(first.data.len(), second.data.len());
    for (a, b) in first.data.iter().zip(&second.data) {
        assert!(a == b || (a.is_nan() && b.is_nan()));
    }
}
