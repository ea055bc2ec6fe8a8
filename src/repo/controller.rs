use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::app::{Result, SplashError};
use crate::domain::ContentItem;
use crate::repo::{ImageRepo, Images};
use crate::store::Store;

/// Status changes of a feed screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    Refreshing(bool),
    RefreshingWithNoData(bool),
    ShowError(bool),
    LoadMoreFailed,
}

/// Owns one [`ImageRepo`] for the lifetime of a screen.
///
/// Operations run inside the controller's scope: once [`close`](Self::close)
/// is called, in-flight operations are dropped before they publish and
/// resolve to [`SplashError::Cancelled`].
pub struct FeedController {
    repo: Mutex<ImageRepo>,
    snapshot_key: String,
    store: Option<Arc<dyn Store + Send + Sync>>,
    images: watch::Receiver<Images>,
    events: broadcast::Sender<FeedEvent>,
    loading_more: AtomicBool,
    cancel: watch::Sender<bool>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl FeedController {
    pub fn new(repo: ImageRepo, store: Option<Arc<dyn Store + Send + Sync>>) -> Self {
        let images = repo.subscribe();
        let snapshot_key = repo.variant().snapshot_key();
        let (events, _) = broadcast::channel(32);
        let (cancel, _) = watch::channel(false);

        Self {
            repo: Mutex::new(repo),
            snapshot_key,
            store,
            images,
            events,
            loading_more: AtomicBool::new(false),
            cancel,
        }
    }

    pub fn events(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    pub fn subscribe(&self) -> watch::Receiver<Images> {
        self.images.clone()
    }

    pub fn images(&self) -> Images {
        self.images.borrow().clone()
    }

    /// Restore the list saved by a previous run. Returns whether anything
    /// was restored; callers refresh when it was not.
    pub async fn init(&self) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };

        let items = match store.load_snapshot(&self.snapshot_key)? {
            Some(items) if !items.is_empty() => items,
            _ => return Ok(false),
        };

        self.cancellable(async {
            let mut repo = self.repo.lock().await;
            Ok(repo.restore(items))
        })
        .await
    }

    /// Look up a photo in the published list.
    pub fn find(&self, id: &str) -> Option<ContentItem> {
        self.images.borrow().iter().find(|i| i.id == id).cloned()
    }

    pub async fn refresh(&self) -> Result<usize> {
        let no_data = self.images.borrow().is_empty();

        self.emit(FeedEvent::Refreshing(true));
        if no_data {
            self.emit(FeedEvent::RefreshingWithNoData(true));
        }

        let result = self
            .cancellable(async {
                let mut repo = self.repo.lock().await;
                let count = repo.refresh().await?;
                self.save_snapshot(&repo.images());
                Ok(count)
            })
            .await;

        self.emit(FeedEvent::Refreshing(false));
        if no_data {
            self.emit(FeedEvent::RefreshingWithNoData(false));
        }

        match &result {
            Ok(_) => self.emit(FeedEvent::ShowError(false)),
            Err(SplashError::Cancelled) => {}
            Err(_) => {
                if self.images.borrow().is_empty() {
                    self.emit(FeedEvent::ShowError(true));
                }
            }
        }

        result
    }

    /// Append the next page. Returns `None` when another load-more is
    /// already running.
    pub async fn load_more(&self) -> Result<Option<usize>> {
        if self.loading_more.swap(true, Ordering::SeqCst) {
            debug!(feed = %self.snapshot_key, "load more already in flight");
            return Ok(None);
        }
        let _in_flight = InFlight(&self.loading_more);

        let result = self
            .cancellable(async {
                let mut repo = self.repo.lock().await;
                let count = repo.load_more().await?;
                self.save_snapshot(&repo.images());
                Ok(count)
            })
            .await;

        match result {
            Ok(count) => Ok(Some(count)),
            Err(SplashError::Cancelled) => Err(SplashError::Cancelled),
            Err(e) => {
                self.emit(FeedEvent::LoadMoreFailed);
                Err(e)
            }
        }
    }

    /// Cancel the scope. Safe to call more than once.
    pub fn close(&self) {
        if !self.cancel.send_replace(true) {
            info!(feed = %self.snapshot_key, "feed controller closed");
        }
    }

    async fn cancellable<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut cancel = self.cancel.subscribe();
        if *cancel.borrow_and_update() {
            return Err(SplashError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.wait_for(|closed| *closed) => Err(SplashError::Cancelled),
            result = operation => result,
        }
    }

    /// An empty list drops the saved snapshot instead of storing it.
    fn save_snapshot(&self, images: &Images) {
        let Some(store) = &self.store else {
            return;
        };

        let result = if images.is_empty() {
            store.clear_snapshot(&self.snapshot_key)
        } else {
            store.save_snapshot(&self.snapshot_key, images)
        };
        if let Err(e) = result {
            warn!(feed = %self.snapshot_key, error = %e, "failed to save snapshot");
        }
    }

    fn emit(&self, event: FeedEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::FeedVariant;
    use crate::store::SqliteStore;
    use crate::test_support::{deps, items, transport_error, PendingSource, ScriptedSource};
    use tokio_test::{assert_pending, assert_ready_err, task};

    fn drain(rx: &mut broadcast::Receiver<FeedEvent>) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn ids(images: &Images) -> Vec<String> {
        images.iter().map(|i| i.id.clone()).collect()
    }

    fn controller(
        source: Arc<ScriptedSource>,
        store: Option<Arc<SqliteStore>>,
    ) -> FeedController {
        let repo = ImageRepo::new(FeedVariant::New, deps(source));
        FeedController::new(repo, store.map(|s| s as Arc<dyn Store + Send + Sync>))
    }

    #[tokio::test]
    async fn test_init_restores_snapshot_without_fetching() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.save_snapshot("new", &items(&["s1", "s2"])).unwrap();
        let source = Arc::new(ScriptedSource::new());
        let controller = controller(source.clone(), Some(store));

        assert!(controller.init().await.unwrap());
        assert_eq!(ids(&controller.images()), vec!["s1", "s2"]);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_more_after_init_does_not_duplicate_first_page() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.save_snapshot("new", &items(&["a", "b", "c", "d"])).unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a", "b"]));
        let controller = controller(source.clone(), Some(store.clone()));

        assert!(controller.init().await.unwrap());
        assert_eq!(controller.load_more().await.unwrap(), Some(2));

        assert_eq!(source.pages(), vec![1]);
        assert_eq!(ids(&controller.images()), vec!["a", "b"]);
        assert_eq!(store.load_snapshot("new").unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_init_without_snapshot() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let controller = controller(Arc::new(ScriptedSource::new()), Some(store));
        assert!(!controller.init().await.unwrap());

        let controller = controller_without_store();
        assert!(!controller.init().await.unwrap());
    }

    fn controller_without_store() -> FeedController {
        controller(Arc::new(ScriptedSource::new()), None)
    }

    #[tokio::test]
    async fn test_refresh_emits_events_and_saves_snapshot() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a", "b"]));
        let controller = controller(source, Some(store.clone()));
        let mut rx = controller.events();

        assert_eq!(controller.refresh().await.unwrap(), 2);

        assert_eq!(
            drain(&mut rx),
            vec![
                FeedEvent::Refreshing(true),
                FeedEvent::RefreshingWithNoData(true),
                FeedEvent::Refreshing(false),
                FeedEvent::RefreshingWithNoData(false),
                FeedEvent::ShowError(false),
            ]
        );
        let saved = store.load_snapshot("new").unwrap().unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_refresh_drops_saved_snapshot() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.save_snapshot("new", &items(&["old"])).unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(Vec::new());
        let controller = controller(source, Some(store.clone()));

        assert_eq!(controller.refresh().await.unwrap(), 0);
        assert!(store.load_snapshot("new").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_in_published_list() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a", "b"]));
        let controller = controller(source, None);

        assert!(controller.find("b").is_none());
        controller.refresh().await.unwrap();
        assert_eq!(controller.find("b").map(|i| i.id), Some("b".to_string()));
        assert!(controller.find("z").is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_with_no_data_shows_error() {
        let source = Arc::new(ScriptedSource::new());
        source.push_err(transport_error());
        let controller = controller(source, None);
        let mut rx = controller.events();

        assert!(controller.refresh().await.is_err());
        assert_eq!(drain(&mut rx).last(), Some(&FeedEvent::ShowError(true)));
    }

    #[tokio::test]
    async fn test_failed_refresh_with_data_keeps_list() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a"])).push_err(transport_error());
        let controller = controller(source, None);

        controller.refresh().await.unwrap();
        let mut rx = controller.events();
        assert!(controller.refresh().await.is_err());

        let events = drain(&mut rx);
        assert!(!events.contains(&FeedEvent::ShowError(true)));
        assert!(!events.contains(&FeedEvent::RefreshingWithNoData(true)));
        assert_eq!(ids(&controller.images()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_load_more_failure_emits_event() {
        let source = Arc::new(ScriptedSource::new());
        source
            .push_ok(items(&["a"]))
            .push_err(transport_error())
            .push_ok(items(&["b"]));
        let controller = controller(source.clone(), None);
        controller.refresh().await.unwrap();
        let mut rx = controller.events();

        assert!(controller.load_more().await.is_err());
        assert_eq!(drain(&mut rx), vec![FeedEvent::LoadMoreFailed]);

        assert_eq!(controller.load_more().await.unwrap(), Some(1));
        assert_eq!(source.pages(), vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_load_more_ignored_while_in_flight() {
        let repo = ImageRepo::new(FeedVariant::Random, deps(Arc::new(PendingSource)));
        let controller = FeedController::new(repo, None);

        {
            let mut first = task::spawn(controller.load_more());
            assert_pending!(first.poll());

            assert_eq!(controller.load_more().await.unwrap(), None);
        }

        // Dropping the pending call releases the guard.
        let mut again = task::spawn(controller.load_more());
        assert_pending!(again.poll());
    }

    #[tokio::test]
    async fn test_close_cancels_in_flight_refresh() {
        let repo = ImageRepo::new(FeedVariant::Random, deps(Arc::new(PendingSource)));
        let controller = FeedController::new(repo, None);
        let rx = controller.subscribe();

        let mut refresh = task::spawn(controller.refresh());
        assert_pending!(refresh.poll());

        controller.close();
        assert!(refresh.is_woken());
        let err = assert_ready_err!(refresh.poll());
        assert!(matches!(err, SplashError::Cancelled));
        drop(refresh);

        assert!(!rx.has_changed().unwrap());
        assert!(controller.images().is_empty());
    }

    #[tokio::test]
    async fn test_calls_after_close_fail_fast() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a"]));
        let controller = controller(source.clone(), None);

        controller.close();
        controller.close();

        assert!(matches!(
            controller.refresh().await,
            Err(SplashError::Cancelled)
        ));
        assert!(matches!(
            controller.load_more().await,
            Err(SplashError::Cancelled)
        ));
        assert!(source.calls().is_empty());
    }
}
