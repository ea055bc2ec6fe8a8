//! Home-screen widget refresh: one random photo, cached locally.

pub mod daemon;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::app::{Result, SplashError};
use crate::cache::{cache_key, CacheStore};
use crate::domain::{DownloadOrigin, DownloadRequest, WidgetState};
use crate::download::DownloadManager;
use crate::fetcher::ByteFetcher;
use crate::repo::{FeedDeps, FeedVariant, DEFAULT_PAGE};
use crate::store::{SqliteStore, Store};

pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MIN_CACHE_BYTES: u64 = 100 * 1024;

/// Where the widget's current image is shown.
pub trait DisplaySink {
    fn show(&self, state: &WidgetState) -> Result<()>;
}

impl DisplaySink for SqliteStore {
    fn show(&self, state: &WidgetState) -> Result<()> {
        self.save_widget_state(state)
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
    Updated {
        image_id: String,
        path: PathBuf,
        cached: bool,
    },
    /// Nothing usable to show; not a failure.
    Skipped(String),
    /// The cycle failed; the next scheduled run retries.
    Abandoned(String),
}

pub struct WidgetRefresh {
    deps: FeedDeps,
    fetcher: Arc<dyn ByteFetcher + Send + Sync>,
    cache: Arc<dyn CacheStore + Send + Sync>,
    display: Arc<dyn DisplaySink + Send + Sync>,
    downloads: Arc<dyn DownloadManager + Send + Sync>,
    download_timeout: Duration,
    min_cache_bytes: u64,
}

impl WidgetRefresh {
    pub fn new(
        deps: FeedDeps,
        fetcher: Arc<dyn ByteFetcher + Send + Sync>,
        cache: Arc<dyn CacheStore + Send + Sync>,
        display: Arc<dyn DisplaySink + Send + Sync>,
        downloads: Arc<dyn DownloadManager + Send + Sync>,
    ) -> Self {
        Self {
            deps,
            fetcher,
            cache,
            display,
            downloads,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            min_cache_bytes: DEFAULT_MIN_CACHE_BYTES,
        }
    }

    pub fn with_download_timeout(mut self, download_timeout: Duration) -> Self {
        self.download_timeout = download_timeout;
        self
    }

    /// Cached files must be strictly larger than this to count as a hit.
    pub fn with_min_cache_bytes(mut self, min_cache_bytes: u64) -> Self {
        self.min_cache_bytes = min_cache_bytes;
        self
    }

    /// Run one cycle. Never fails; the outcome says what happened.
    pub async fn run(&self) -> WidgetOutcome {
        let items = match FeedVariant::Random.load_data(&self.deps, DEFAULT_PAGE).await {
            Ok(items) => items,
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "widget: failed to load random photos");
                return WidgetOutcome::Abandoned(format!("fetch failed: {}", e));
            }
        };

        let Some(item) = items.choose(&mut rand::thread_rng()).cloned() else {
            warn!("widget: random page was empty");
            return WidgetOutcome::Abandoned("no photos returned".into());
        };

        let Some(list_url) = item.usable_list_url() else {
            debug!(id = %item.id, "widget: photo has no list url");
            return WidgetOutcome::Skipped(format!("{} has no list url", item.id));
        };

        let key = cache_key(list_url.as_str());
        let (path, cached) = if self.is_cache_hit(&key).await {
            debug!(id = %item.id, key = %key, "widget: cache hit");
            (self.cache.path_for(&key), true)
        } else {
            match self.download(list_url.as_str(), &key).await {
                Ok(path) => (path, false),
                Err(e) => {
                    warn!(
                        id = %item.id,
                        url = %list_url,
                        kind = ?e.kind(),
                        error = %e,
                        "widget: error downloading image"
                    );
                    return WidgetOutcome::Abandoned(format!("download failed: {}", e));
                }
            }
        };

        let state = WidgetState::new(item.id.clone(), path.clone(), item.download_url.clone());
        if let Err(e) = self.display.show(&state) {
            warn!(id = %item.id, error = %e, "widget: failed to update display");
            return WidgetOutcome::Abandoned(format!("display update failed: {}", e));
        }

        if let Some(request) =
            DownloadRequest::for_item(&item, DownloadOrigin::Widget, Some(path.clone()))
        {
            self.downloads.enqueue(request);
        }

        info!(id = %item.id, path = %path.display(), cached, "widget updated");
        WidgetOutcome::Updated {
            image_id: item.id,
            path,
            cached,
        }
    }

    async fn is_cache_hit(&self, key: &str) -> bool {
        self.cache.exists(key).await && self.cache.size_bytes(key).await > self.min_cache_bytes
    }

    async fn download(&self, url: &str, key: &str) -> Result<PathBuf> {
        let bytes = timeout(self.download_timeout, self.fetcher.fetch_bytes(url))
            .await
            .map_err(|_| SplashError::Timeout(self.download_timeout))??;
        self.cache.write(key, &bytes).await
    }
}
