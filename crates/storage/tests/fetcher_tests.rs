//! Fetching scenes from an in-memory archive.

use std::sync::Arc;

use bytes::Bytes;
use goes_common::{Channel, ScanTime};
use object_store::memory::InMemory;
use storage::{ArchiveConfig, FetchOutcome, Fetcher, SceneStore};
use test_utils::{fog_scan_time, sample_base_name, sample_object_key, temp_test_dir, MISSING_SCAN_TIME};

fn channel(n: u8) -> Channel {
    Channel::new(n).unwrap()
}

async fn seeded_store(keys: &[String]) -> SceneStore {
    let store = SceneStore::from_store(Arc::new(InMemory::new()), "noaa-goes16");
    for key in keys {
        store
            .put(key, Bytes::from(format!("contents of {}", key)))
            .await
            .unwrap();
    }
    store
}

fn dir_listing(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Download
// ============================================================================

#[tokio::test]
async fn test_fetch_downloads_matching_scene() {
    let dir = temp_test_dir();
    let input = dir.path().join("input");
    let store = seeded_store(&[sample_object_key(7), sample_object_key(13)]).await;
    let fetcher = Fetcher::new(store, ArchiveConfig::default(), &input);

    let outcome = fetcher.fetch(fog_scan_time(), channel(13)).await.unwrap();
    let FetchOutcome::Fetched(scene) = outcome else {
        panic!("expected a fetched scene");
    };

    assert_eq!(scene.base_name, sample_base_name(13));
    assert!(scene.downloaded);
    assert_eq!(
        std::fs::read_to_string(&scene.path).unwrap(),
        format!("contents of {}", sample_object_key(13))
    );
    // Only the requested channel, and no partial file left behind.
    assert_eq!(dir_listing(&input), vec![format!("{}.nc", sample_base_name(13))]);
}

#[tokio::test]
async fn test_second_fetch_reuses_local_copy() {
    let dir = temp_test_dir();
    let key = sample_object_key(7);
    let store = seeded_store(&[key.clone()]).await;
    let fetcher = Fetcher::new(store.clone(), ArchiveConfig::default(), dir.path());

    let first = fetcher.fetch(fog_scan_time(), channel(7)).await.unwrap();

    // With the object gone a network lookup would report NotFound.
    store.delete(&key).await.unwrap();
    let second = fetcher.fetch(fog_scan_time(), channel(7)).await.unwrap();

    assert_eq!(first.base_name(), second.base_name());
    match second {
        FetchOutcome::Fetched(scene) => assert!(!scene.downloaded),
        other => panic!("expected local reuse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_multiple_matches_take_first() {
    let dir = temp_test_dir();
    let later = "ABI-L2-CMIPF/2021/188/10/OR_ABI-L2-CMIPF-M6C07_G16_s20211881000500_e20211881009999_c20211881010099.nc";
    let store = seeded_store(&[later.to_string(), sample_object_key(7)]).await;
    let fetcher = Fetcher::new(store, ArchiveConfig::default(), dir.path());

    let outcome = fetcher.fetch(fog_scan_time(), channel(7)).await.unwrap();
    assert_eq!(outcome.base_name(), Some(sample_base_name(7).as_str()));
}

// ============================================================================
// Missing scenes
// ============================================================================

#[tokio::test]
async fn test_missing_scene_is_not_found_and_writes_nothing() {
    let dir = temp_test_dir();
    let input = dir.path().join("input");
    let store = seeded_store(&[sample_object_key(7), sample_object_key(13)]).await;
    let fetcher = Fetcher::new(store, ArchiveConfig::default(), &input);

    let time = ScanTime::parse(MISSING_SCAN_TIME).unwrap();
    match fetcher.fetch(time, channel(13)).await.unwrap() {
        FetchOutcome::NotFound { prefix } => {
            assert_eq!(prefix, "ABI-L2-CMIPF/2021/188/10/OR_ABI-L2-CMIPF-M6C13_G16_s20211881003");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(dir_listing(&input).is_empty());
}

#[tokio::test]
async fn test_partial_file_is_not_a_local_hit() {
    let dir = temp_test_dir();
    let partial = dir.path().join(format!("{}.nc.partial", sample_base_name(13)));
    std::fs::write(&partial, b"truncated").unwrap();

    let store = seeded_store(&[]).await;
    let fetcher = Fetcher::new(store, ArchiveConfig::default(), dir.path());

    let outcome = fetcher.fetch(fog_scan_time(), channel(13)).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::NotFound { .. }));
}
