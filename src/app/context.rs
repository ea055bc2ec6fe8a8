use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::warn;

use crate::app::error::{Result, SplashError};
use crate::cache::FileCache;
use crate::config::{Config, PreferenceTable};
use crate::download::{spawn_download_queue, DownloadQueue};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::repo::{FeedController, FeedDeps, FeedVariant, ImageRepo};
use crate::store::sqlite::SqliteStore;
use crate::store::Store;
use crate::widget::WidgetRefresh;

const APP_DIR: &str = "splashfeed";

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<HttpFetcher>,
    pub cache: Arc<FileCache>,
    pub downloads: DownloadQueue,
    prefs: Arc<PreferenceTable>,
    download_worker: Mutex<Option<JoinHandle<()>>>,
}

impl AppContext {
    /// Wire the app from `config`. Must be called inside a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.paths.database {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };
        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let cache_dir = match &config.paths.cache_dir {
            Some(p) => p.clone(),
            None => Self::default_cache_dir()?,
        };
        let download_dir = match &config.paths.download_dir {
            Some(p) => p.clone(),
            None => Self::default_download_dir()?,
        };

        let fetcher = Arc::new(HttpFetcher::new(config.api.clone()));
        let cache = Arc::new(FileCache::new(cache_dir));
        let (downloads, worker) = spawn_download_queue(store.clone(), fetcher.clone(), download_dir);
        let prefs = Arc::new(config.preferences.clone());

        Ok(Self {
            config,
            store,
            fetcher,
            cache,
            downloads,
            prefs,
            download_worker: Mutex::new(Some(worker)),
        })
    }

    pub fn feed_deps(&self) -> FeedDeps {
        FeedDeps::new(self.fetcher.clone(), self.prefs.clone())
    }

    pub fn repo(&self, variant: FeedVariant) -> ImageRepo {
        ImageRepo::new(variant, self.feed_deps())
    }

    pub fn controller(&self, variant: FeedVariant) -> FeedController {
        let store: Arc<dyn Store + Send + Sync> = self.store.clone();
        FeedController::new(self.repo(variant), Some(store))
    }

    pub fn widget(&self) -> WidgetRefresh {
        WidgetRefresh::new(
            self.feed_deps(),
            self.fetcher.clone(),
            self.cache.clone(),
            self.store.clone(),
            Arc::new(self.downloads.clone()),
        )
        .with_download_timeout(self.config.widget.download_timeout())
        .with_min_cache_bytes(self.config.widget.min_cache_bytes())
    }

    /// Let queued downloads finish, then stop the worker.
    pub async fn shutdown(&self) {
        self.downloads.shutdown().await;

        let worker = self.download_worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "download worker panicked");
            }
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| SplashError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join(APP_DIR);
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("splashfeed.db"))
    }

    fn default_cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| SplashError::Config("Could not find cache directory".into()))?;
        Ok(cache_dir.join(APP_DIR).join("images"))
    }

    fn default_download_dir() -> Result<PathBuf> {
        let dir = dirs::picture_dir()
            .or_else(dirs::download_dir)
            .or_else(dirs::data_dir)
            .ok_or_else(|| SplashError::Config("Could not find a download directory".into()))?;
        Ok(dir.join(APP_DIR))
    }
}
