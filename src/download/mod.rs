//! Background downloads of full-size images.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::{Result, SplashError};
use crate::cache::atomic_write;
use crate::domain::{DownloadRequest, DownloadStatus};
use crate::fetcher::ByteFetcher;
use crate::store::Store;

const QUEUE_CAPACITY: usize = 64;

/// Fire-and-forget download submission.
pub trait DownloadManager {
    fn enqueue(&self, request: DownloadRequest);
}

#[derive(Debug)]
enum DownloadMessage {
    Fetch(DownloadRequest),
    Retry(i64),
    Shutdown,
}

/// Handle to the download worker.
#[derive(Clone)]
pub struct DownloadQueue {
    tx: mpsc::Sender<DownloadMessage>,
}

impl DownloadQueue {
    /// Re-run a recorded download.
    pub async fn retry(&self, id: i64) -> Result<()> {
        self.tx
            .send(DownloadMessage::Retry(id))
            .await
            .map_err(|_| SplashError::Other("download worker stopped".into()))
    }

    /// Ask the worker to stop once queued downloads are done.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(DownloadMessage::Shutdown).await;
    }
}

impl DownloadManager for DownloadQueue {
    fn enqueue(&self, request: DownloadRequest) {
        if let Err(e) = self.tx.try_send(DownloadMessage::Fetch(request)) {
            warn!(error = %e, "failed to queue download");
        }
    }
}

struct DownloadWorker {
    store: Arc<dyn Store + Send + Sync>,
    fetcher: Arc<dyn ByteFetcher + Send + Sync>,
    dir: PathBuf,
    rx: mpsc::Receiver<DownloadMessage>,
}

impl DownloadWorker {
    async fn run(mut self) {
        info!(dir = %self.dir.display(), "download worker started");

        while let Some(msg) = self.rx.recv().await {
            match msg {
                DownloadMessage::Fetch(request) => match self.store.add_download(&request) {
                    Ok(id) => self.process(id, &request).await,
                    Err(e) => error!(url = %request.url, error = %e, "failed to record download"),
                },
                DownloadMessage::Retry(id) => self.retry(id).await,
                DownloadMessage::Shutdown => {
                    info!("download worker shutting down");
                    break;
                }
            }
        }
    }

    async fn retry(&self, id: i64) {
        let record = match self.store.get_download(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(id, "no such download");
                return;
            }
            Err(e) => {
                error!(id, error = %e, "failed to load download");
                return;
            }
        };

        if let Err(e) = self.store.set_download_status(id, DownloadStatus::Pending) {
            error!(id, error = %e, "failed to reset download");
            return;
        }

        let request = DownloadRequest {
            url: record.url,
            file_name: record.file_name,
            preview_path: record.preview_path,
            origin: record.origin,
        };
        self.process(id, &request).await;
    }

    async fn process(&self, id: i64, request: &DownloadRequest) {
        let status = match self.download(request).await {
            Ok(path) => {
                info!(id, path = %path.display(), "download completed");
                DownloadStatus::Completed
            }
            Err(e) => {
                warn!(id, url = %request.url, kind = ?e.kind(), error = %e, "download failed");
                DownloadStatus::Failed
            }
        };

        if let Err(e) = self.store.set_download_status(id, status) {
            error!(id, error = %e, "failed to update download status");
        }
    }

    async fn download(&self, request: &DownloadRequest) -> Result<PathBuf> {
        let bytes = self.fetcher.fetch_bytes(&request.url).await?;
        let path = self.dir.join(safe_file_name(&request.file_name));
        atomic_write(&path, &bytes).await?;
        Ok(path)
    }
}

fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "download.jpg".to_string())
}

/// Spawn the download worker as a tokio task.
pub fn spawn_download_queue(
    store: Arc<dyn Store + Send + Sync>,
    fetcher: Arc<dyn ByteFetcher + Send + Sync>,
    dir: PathBuf,
) -> (DownloadQueue, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    let worker = DownloadWorker {
        store,
        fetcher,
        dir,
        rx,
    };

    let join = tokio::spawn(worker.run());
    (DownloadQueue { tx }, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DownloadOrigin;
    use crate::store::SqliteStore;
    use crate::test_support::{transport_error, ScriptedBytes};
    use tempfile::TempDir;

    fn request(file_name: &str) -> DownloadRequest {
        DownloadRequest {
            url: "https://images.example.com/a?full".into(),
            file_name: file_name.into(),
            preview_path: None,
            origin: DownloadOrigin::Widget,
        }
    }

    #[test]
    fn test_safe_file_name_strips_directories() {
        assert_eq!(safe_file_name("Jane - a.jpg"), "Jane - a.jpg");
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name(""), "download.jpg");
    }

    #[tokio::test]
    async fn test_download_completes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let bytes = Arc::new(ScriptedBytes::new());
        bytes.push_ok(vec![9u8; 512]);

        let (queue, join) = spawn_download_queue(store.clone(), bytes.clone(), dir.path().into());
        queue.enqueue(request("Jane - a.jpg"));
        queue.shutdown().await;
        join.await.unwrap();

        let records = store.get_downloads().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DownloadStatus::Completed);
        assert_eq!(std::fs::read(dir.path().join("Jane - a.jpg")).unwrap().len(), 512);
        assert_eq!(bytes.urls(), vec!["https://images.example.com/a?full"]);
    }

    #[tokio::test]
    async fn test_failed_download_then_retry() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let bytes = Arc::new(ScriptedBytes::new());
        bytes.push_err(transport_error()).push_ok(vec![1u8; 8]);

        let (queue, join) = spawn_download_queue(store.clone(), bytes, dir.path().into());
        queue.enqueue(request("a.jpg"));
        // Queued behind the first attempt, which records id 1.
        queue.retry(1).await.unwrap();
        queue.shutdown().await;
        join.await.unwrap();

        let record = store.get_download(1).unwrap().unwrap();
        assert_eq!(record.status, DownloadStatus::Completed);
        assert!(dir.path().join("a.jpg").exists());
        assert_eq!(store.get_downloads().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let bytes = Arc::new(ScriptedBytes::new());
        bytes.push_err(transport_error());

        let (queue, join) = spawn_download_queue(store.clone(), bytes, dir.path().into());
        queue.enqueue(request("a.jpg"));
        queue.shutdown().await;
        join.await.unwrap();

        assert_eq!(store.get_downloads().unwrap()[0].status, DownloadStatus::Failed);
        assert!(!dir.path().join("a.jpg").exists());
    }
}
