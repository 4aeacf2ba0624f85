//! Locate and download ABI scenes into a local input directory.
//!
//! A scene already present locally is reused without touching the network.
//! Downloads go to `<name>.partial` and are renamed into place, so an
//! interrupted transfer never looks like a complete scene.

use std::path::{Path, PathBuf};

use goes_common::{Channel, ScanTime};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, FetchResult};
use crate::object_store::{ArchiveConfig, SceneStore};
use crate::paths::ScenePath;

/// A scene file available in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedScene {
    /// File name without `.nc`
    pub base_name: String,
    pub path: PathBuf,
    /// False when a local copy was reused.
    pub downloaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(FetchedScene),
    /// Nothing published under the key prefix. Nothing was written.
    NotFound { prefix: String },
}

impl FetchOutcome {
    pub fn base_name(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(scene) => Some(&scene.base_name),
            FetchOutcome::NotFound { .. } => None,
        }
    }
}

pub struct Fetcher {
    store: SceneStore,
    archive: ArchiveConfig,
    input_dir: PathBuf,
}

impl Fetcher {
    pub fn new(store: SceneStore, archive: ArchiveConfig, input_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            archive,
            input_dir: input_dir.into(),
        }
    }

    /// Make the scene for `channel` at `time` available locally.
    #[instrument(skip(self), fields(time = %time, channel = %channel))]
    pub async fn fetch(&self, time: ScanTime, channel: Channel) -> FetchResult<FetchOutcome> {
        let scene = ScenePath::new(&self.archive, channel, time);
        fs::create_dir_all(&self.input_dir).await?;

        if let Some(path) = self.find_local(&scene).await? {
            let base_name = base_name_of(&path)?;
            info!(path = %path.display(), "Scene already present, skipping download");
            return Ok(FetchOutcome::Fetched(FetchedScene {
                base_name,
                path,
                downloaded: false,
            }));
        }

        let candidates: Vec<String> = self
            .store
            .list_directory(&scene.directory())
            .await?
            .into_iter()
            .filter(|key| scene.matches_file(file_name_of(key)))
            .collect();

        let key = match candidates.as_slice() {
            [] => {
                let prefix = scene.key_prefix();
                warn!(prefix = %prefix, "No scene published for this time and channel");
                return Ok(FetchOutcome::NotFound { prefix });
            }
            [only] => only,
            [first, ..] => {
                warn!(
                    count = candidates.len(),
                    chosen = %first,
                    "Several scenes match; using the first"
                );
                first
            }
        };

        let path = self.download(key).await?;
        let base_name = base_name_of(&path)?;
        Ok(FetchOutcome::Fetched(FetchedScene {
            base_name,
            path,
            downloaded: true,
        }))
    }

    /// First `.nc` file in the input directory matching the scene prefix.
    async fn find_local(&self, scene: &ScenePath) -> FetchResult<Option<PathBuf>> {
        let mut matches = Vec::new();
        let mut entries = fs::read_dir(&self.input_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if scene.matches_file(name) {
                    matches.push(entry.path());
                }
            }
        }
        matches.sort();
        Ok(matches.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn download(&self, key: &str) -> FetchResult<PathBuf> {
        let file_name = file_name_of(key);
        let final_path = self.input_dir.join(file_name);
        let partial_path = self.input_dir.join(format!("{}.partial", file_name));

        debug!(partial = %partial_path.display(), "Writing partial file");
        let size = match self.copy_then_rename(key, &partial_path, &final_path).await {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&partial_path).await;
                return Err(e);
            }
        };

        info!(path = %final_path.display(), size, "Downloaded scene");
        Ok(final_path)
    }

    async fn copy_then_rename(&self, key: &str, partial: &Path, target: &Path) -> FetchResult<u64> {
        let mut file = fs::File::create(partial).await?;
        let size = self.store.copy_to(key, &mut file).await?;
        drop(file);
        fs::rename(partial, target).await?;
        Ok(size)
    }
}

fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn base_name_of(path: &Path) -> FetchResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(".nc"))
        .map(str::to_string)
        .ok_or_else(|| FetchError::InvalidKey(path.display().to_string()))
}
