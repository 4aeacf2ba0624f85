//! Difference and reprojection of synthetic full-disk scenes.

use grid_processor::{difference, reproject_to_file, GridError, DEFAULT_RESOLUTION};
use netcdf_parser::{read_geographic_grid, read_scene, Scene, CMI_VARIABLE};
use projection::Geostationary;
use test_utils::{
    assert_approx_eq, fog_extent, kelvin_field, sample_base_name, temp_test_dir, SyntheticScene,
};

/// Channel 7 runs this much warmer than channel 13 in the synthetic scenes.
const C07_OFFSET_K: f32 = 1.5;

fn load(dir: &std::path::Path, channel: u8, synthetic: &SyntheticScene) -> Scene {
    let base = sample_base_name(channel);
    synthetic.write(&dir.join(format!("{}.nc", base))).unwrap();
    read_scene(dir, &base, CMI_VARIABLE, 0.0).unwrap()
}

#[test]
fn test_btd_reprojected_to_fog_extent() {
    let dir = temp_test_dir();
    let projection = Geostationary::goes16_full_disk_decimated(8);

    let c13 = load(dir.path(), 13, &SyntheticScene::from_field(projection.clone(), kelvin_field));
    let c07 = load(
        dir.path(),
        7,
        &SyntheticScene::from_field(projection, |lon, lat| kelvin_field(lon, lat) + C07_OFFSET_K),
    );

    let btd = difference(&c13, &c07).unwrap();
    assert_eq!(btd.time_coverage_start, c13.time_coverage_start);

    let stem = dir.path().join("output").join("fog");
    let warped = reproject_to_file(&btd, &fog_extent(), DEFAULT_RESOLUTION, &stem).unwrap();

    assert!(warped.path.ends_with("fog_ret.nc"));
    assert_eq!((warped.grid.width, warped.grid.height), (1250, 1000));

    // The whole region is on the disk, so every cell is valid.
    assert_eq!(warped.grid.valid_count(), 1250 * 1000);
    let (min, max) = warped.grid.valid_range().unwrap();
    // Two packing quanta of slack.
    assert!(min >= -C07_OFFSET_K - 0.09 && max <= -C07_OFFSET_K + 0.09, "BTD range {} .. {}", min, max);

    let back = read_geographic_grid(&warped.path).unwrap();
    assert_eq!((back.width, back.height), (1250, 1000));
    assert_approx_eq!(back.extent.min_lon, -60.0, DEFAULT_RESOLUTION);
    assert_approx_eq!(back.extent.max_lon, -35.0, DEFAULT_RESOLUTION);
    assert_approx_eq!(back.extent.min_lat, -45.0, DEFAULT_RESOLUTION);
    assert_approx_eq!(back.extent.max_lat, -25.0, DEFAULT_RESOLUTION);
}

#[test]
fn test_reprojection_keeps_north_at_top() {
    let dir = temp_test_dir();
    let projection = Geostationary::goes16_full_disk_decimated(8);
    // Warmer to the north and to the east.
    let scene = load(
        dir.path(),
        13,
        &SyntheticScene::from_field(projection, |lon, lat| (250.0 + lat + 0.5 * lon) as f32),
    );

    let stem = dir.path().join("orientation");
    let warped = reproject_to_file(&scene, &fog_extent(), DEFAULT_RESOLUTION, &stem).unwrap();
    let grid = &warped.grid;

    let top_left = grid.data[0];
    let bottom_left = grid.data[(grid.height - 1) * grid.width];
    let top_right = grid.data[grid.width - 1];
    assert!(top_left > bottom_left, "north {} should exceed south {}", top_left, bottom_left);
    assert!(top_right > top_left, "east {} should exceed west {}", top_right, top_left);

    // Upper-left cell centre sits at (-59.99, -25.01).
    assert_approx_eq!(top_left, 250.0 - 25.01 - 0.5 * 59.99, 0.5);
}

#[test]
fn test_difference_rejects_different_grids() {
    let dir = temp_test_dir();
    let c13 = load(
        dir.path(),
        13,
        &SyntheticScene::from_field(Geostationary::goes16_full_disk_decimated(16), kelvin_field),
    );
    let c07 = load(
        dir.path(),
        7,
        &SyntheticScene::from_field(Geostationary::goes16_full_disk_decimated(32), kelvin_field),
    );

    assert!(matches!(difference(&c13, &c07), Err(GridError::ShapeMismatch { .. })));
}
