//! Locating optional test data.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Bundled map assets (boundaries, coastline, places).
pub fn assets_dir() -> PathBuf {
    workspace_root().join("assets")
}

/// Product definitions shipped with the pipeline binary.
pub fn product_config_dir() -> PathBuf {
    workspace_root().join("config").join("products")
}

/// Search for a test file.
///
/// Checks `TEST_DATA_DIR` first, then `<workspace>/testdata` and `<workspace>/input`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([root.join("testdata").join(name), root.join("input").join(name)]);

    candidates.into_iter().find(|path| path.exists())
}

/// Temporary directory removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
