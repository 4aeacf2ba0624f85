//! Object storage access to the GOES archive (public S3 bucket).

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::error::{FetchError, FetchResult};

/// Where scenes are published and how their keys are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Bucket name
    pub bucket: String,
    /// AWS region of the bucket
    pub region: String,
    /// Optional S3-compatible endpoint (mirrors, local MinIO)
    pub endpoint: Option<String>,
    /// ABI product directory, e.g. `ABI-L2-CMIPF`
    pub product: String,
    /// Platform tag in file names
    pub satellite: String,
    /// ABI scan mode
    pub scan_mode: u8,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: "noaa-goes16".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            product: "ABI-L2-CMIPF".to_string(),
            satellite: "G16".to_string(),
            scan_mode: 6,
        }
    }
}

/// Read-mostly client over the scene archive.
#[derive(Clone)]
pub struct SceneStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl SceneStore {
    /// Anonymous (unsigned) S3 client for a public bucket.
    pub fn new(config: &ArchiveConfig) -> FetchResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_skip_signature(true);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| FetchError::Store(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// Wrap an existing backend, e.g. `InMemory` in tests.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Keys of the objects directly under `directory`, sorted.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn list_directory(&self, directory: &str) -> FetchResult<Vec<String>> {
        let prefix = Path::from(directory);

        let listing = self
            .store
            .list_with_delimiter(Some(&prefix))
            .await
            .map_err(|e| FetchError::Store(format!("Failed to list {}: {}", directory, e)))?;

        let mut keys: Vec<String> = listing
            .objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();
        keys.sort();

        debug!(count = keys.len(), "Listed directory");
        Ok(keys)
    }

    /// Stream an object into `file` chunk by chunk. Returns the byte count.
    #[instrument(skip(self, file), fields(bucket = %self.bucket))]
    pub async fn copy_to(&self, key: &str, file: &mut tokio::fs::File) -> FetchResult<u64> {
        let location = Path::from(key);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| FetchError::Store(format!("Failed to read {}: {}", key, e)))?;

        let mut stream = result.into_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| FetchError::Store(format!("Failed to stream {}: {}", key, e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(size = written, "Streamed object");
        Ok(written)
    }

    /// Write an object. The archive is read-only in production; this seeds
    /// mirrors and test stores.
    #[instrument(skip(self, data), fields(bucket = %self.bucket))]
    pub async fn put(&self, key: &str, data: Bytes) -> FetchResult<()> {
        let location = Path::from(key);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| FetchError::Store(format!("Failed to write {}: {}", key, e)))?;

        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn delete(&self, key: &str) -> FetchResult<()> {
        self.store
            .delete(&Path::from(key))
            .await
            .map_err(|e| FetchError::Store(format!("Failed to delete {}: {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[test]
    fn test_default_archive() {
        let config = ArchiveConfig::default();
        assert_eq!(config.bucket, "noaa-goes16");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.product, "ABI-L2-CMIPF");
        assert_eq!(config.scan_mode, 6);
    }

    #[test]
    fn test_anonymous_client_builds() {
        let store = SceneStore::new(&ArchiveConfig::default()).unwrap();
        assert_eq!(store.bucket(), "noaa-goes16");
    }

    #[tokio::test]
    async fn test_list_directory_is_shallow_and_sorted() {
        let store = SceneStore::from_store(Arc::new(InMemory::new()), "test");
        for key in ["a/b/2.nc", "a/b/1.nc", "a/b/c/3.nc", "a/x.nc"] {
            store.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        let keys = store.list_directory("a/b").await.unwrap();
        assert_eq!(keys, vec!["a/b/1.nc".to_string(), "a/b/2.nc".to_string()]);
    }

    #[tokio::test]
    async fn test_copy_to_streams_whole_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = SceneStore::from_store(Arc::new(InMemory::new()), "test");
        store.put("a/scene.nc", Bytes::from_static(b"abcdef")).await.unwrap();

        let path = dir.path().join("scene.nc");
        let mut file = tokio::fs::File::create(&path).await.unwrap();
        assert_eq!(store.copy_to("a/scene.nc", &mut file).await.unwrap(), 6);
        drop(file);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_copy_missing_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SceneStore::from_store(Arc::new(InMemory::new()), "test");
        let mut file = tokio::fs::File::create(dir.path().join("x")).await.unwrap();
        assert!(matches!(store.copy_to("nope.nc", &mut file).await, Err(FetchError::Store(_))));
    }
}
