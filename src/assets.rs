//! Asset stores turn downloaded media bytes into a playable URL.

use crate::error::StudioError;
use crate::types::{MediaAsset, MediaKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist the asset and return a URL a player can open.
    async fn store(&self, kind: MediaKind, asset: MediaAsset) -> Result<String, StudioError>;
}

/// Writes assets to a directory and hands out `file://` URLs.
pub struct DirectoryAssetStore {
    dir: PathBuf,
    counter: AtomicU64,
}

impl DirectoryAssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    fn next_path(&self, kind: MediaKind, asset: &MediaAsset) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        self.dir.join(format!(
            "{}-{}-{:02}.{}",
            kind.as_str(),
            stamp,
            seq,
            asset.extension()
        ))
    }
}

/// Render a filesystem path as a `file://` URL.
pub fn file_url(path: &Path) -> String {
    let absolute = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Path component of a `file://` URL.
pub fn path_from_file_url(url: &str) -> Option<PathBuf> {
    url.strip_prefix("file://").map(PathBuf::from)
}

#[async_trait]
impl AssetStore for DirectoryAssetStore {
    async fn store(&self, kind: MediaKind, asset: MediaAsset) -> Result<String, StudioError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StudioError::AssetStore(format!(
                "Failed to create output directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        let path = self.next_path(kind, &asset);
        tokio::fs::write(&path, &asset.bytes).await.map_err(|e| {
            StudioError::AssetStore(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), bytes = asset.bytes.len(), "Asset written");
        Ok(file_url(&path))
    }
}

/// Keeps assets in memory under `memory://<kind>/<n>` URLs.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: Mutex<HashMap<String, MediaAsset>>,
    counter: AtomicU64,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<MediaAsset> {
        self.assets.lock().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.lock().is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn store(&self, kind: MediaKind, asset: MediaAsset) -> Result<String, StudioError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let url = format!("memory://{}/{}", kind.as_str(), n);
        self.assets.lock().insert(url.clone(), asset);
        Ok(url)
    }
}
