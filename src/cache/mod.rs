//! On-disk image cache keyed by list URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::app::Result;

#[async_trait]
pub trait CacheStore {
    async fn exists(&self, key: &str) -> bool;
    /// Size of the cached file, 0 when missing.
    async fn size_bytes(&self, key: &str) -> u64;
    /// Persist `bytes` under `key` and return the final path.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<PathBuf>;
    fn path_for(&self, key: &str) -> PathBuf;
}

/// Cache file name for an image: hex SHA-256 of its list URL.
pub fn cache_key(list_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(list_url.as_bytes());
    format!("{}.jpg", hex::encode(hasher.finalize()))
}

/// Write to a sibling temp file, then rename over `path`.
pub(crate) async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = temp_path_for(path);
    let written = match fs::write(&temp_path, bytes).await {
        Ok(()) => fs::rename(&temp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}

/// `<file name>.<pid>.tmp` next to `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn exists(&self, key: &str) -> bool {
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    async fn size_bytes(&self, key: &str) -> u64 {
        fs::metadata(self.path_for(key))
            .await
            .map(|m| m.len())
            .unwrap_or(0)
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(key);
        atomic_write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "cached image");
        Ok(path)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}
