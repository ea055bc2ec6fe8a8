//! Paginated photo lists.
//!
//! An [`ImageRepo`] owns the page cursor and the accumulated list of one feed.
//! `refresh` replaces the list with page 1, `load_more` appends the next page.
//! State is published on a [`watch`] channel, and only after the fetch for it
//! has completed successfully.

pub mod controller;
pub mod variant;

pub use controller::{FeedController, FeedEvent};
pub use variant::{FeedDeps, FeedVariant};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::{Result, SplashError};
use crate::domain::ContentItem;

pub const DEFAULT_PAGE: u32 = 1;

/// Published list snapshot.
pub type Images = Arc<Vec<ContentItem>>;

pub struct ImageRepo {
    variant: FeedVariant,
    deps: FeedDeps,
    page: u32,
    data: Vec<ContentItem>,
    fetched: bool,
    images: watch::Sender<Images>,
}

impl ImageRepo {
    pub fn new(variant: FeedVariant, deps: FeedDeps) -> Self {
        let (images, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            variant,
            deps,
            page: DEFAULT_PAGE,
            data: Vec::new(),
            fetched: false,
            images,
        }
    }

    pub fn variant(&self) -> &FeedVariant {
        &self.variant
    }

    /// Page the next `load_more` will fetch.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Currently published list.
    pub fn images(&self) -> Images {
        self.images.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Images> {
        self.images.subscribe()
    }

    /// Change the search keyword used by subsequent pages.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> Result<()> {
        match &mut self.variant {
            FeedVariant::Search { keyword: current } => {
                *current = Some(keyword.into());
                Ok(())
            }
            other => Err(SplashError::Unsupported(format!(
                "{} feed has no keyword",
                other.name()
            ))),
        }
    }

    /// Publish a list persisted by an earlier run without fetching.
    ///
    /// Only the published state changes: the cursor stays at the first page
    /// and the accumulated list stays empty, so the next fetch replaces the
    /// restored items. Ignored once a fetch has succeeded; returns whether the
    /// list was applied.
    pub fn restore(&mut self, items: Vec<ContentItem>) -> bool {
        if self.fetched {
            warn!(feed = self.variant.name(), "restore ignored after a successful fetch");
            return false;
        }

        info!(feed = self.variant.name(), count = items.len(), "restoring images");
        self.images.send_replace(Arc::new(items));
        true
    }

    /// Replace the list with the first page. Returns the number of items fetched.
    pub async fn refresh(&mut self) -> Result<usize> {
        info!(feed = self.variant.name(), "start refresh");

        match self.variant.load_data(&self.deps, DEFAULT_PAGE).await {
            Ok(items) => {
                let count = items.len();
                self.data.clear();
                self.data.extend(items);
                self.publish();

                self.page = DEFAULT_PAGE + 1;
                self.fetched = true;
                Ok(count)
            }
            Err(e) => {
                warn!(
                    feed = self.variant.name(),
                    kind = ?e.kind(),
                    error = %e,
                    "error on refresh"
                );
                Err(e)
            }
        }
    }

    /// Append the page at the cursor. Returns the number of items fetched.
    pub async fn load_more(&mut self) -> Result<usize> {
        info!(feed = self.variant.name(), page = self.page, "start load more");

        match self.variant.load_data(&self.deps, self.page).await {
            Ok(items) => {
                let count = items.len();
                self.data.extend(items);
                self.publish();

                self.page += 1;
                self.fetched = true;
                Ok(count)
            }
            Err(e) => {
                warn!(
                    feed = self.variant.name(),
                    page = self.page,
                    kind = ?e.kind(),
                    error = %e,
                    "error on load more"
                );
                Err(e)
            }
        }
    }

    fn publish(&self) {
        self.images.send_replace(Arc::new(self.data.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{deps, items, transport_error, PendingSource, ScriptedSource};
    use tokio_test::{assert_err, assert_ok, assert_pending, task};

    fn ids(images: &Images) -> Vec<String> {
        images.iter().map(|i| i.id.clone()).collect()
    }

    fn repo(source: &Arc<ScriptedSource>) -> ImageRepo {
        ImageRepo::new(FeedVariant::New, deps(source.clone()))
    }

    #[tokio::test]
    async fn test_refresh_then_load_more_scenario() {
        let source = Arc::new(ScriptedSource::new());
        source
            .push_ok(items(&["A", "B", "C"]))
            .push_ok(items(&["D", "E"]))
            .push_err(transport_error());
        let mut repo = repo(&source);

        assert_eq!(assert_ok!(repo.refresh().await), 3);
        assert_eq!(ids(&repo.images()), vec!["A", "B", "C"]);
        assert_eq!(repo.page(), 2);

        assert_eq!(assert_ok!(repo.load_more().await), 2);
        assert_eq!(ids(&repo.images()), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(repo.page(), 3);

        let err = assert_err!(repo.load_more().await);
        assert!(err.is_transport());
        assert_eq!(ids(&repo.images()), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(repo.page(), 3);

        assert_eq!(source.pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_list() {
        let source = Arc::new(ScriptedSource::new());
        source
            .push_ok(items(&["A", "B", "C"]))
            .push_ok(items(&["D", "E"]))
            .push_ok(items(&["F"]));
        let mut repo = repo(&source);

        repo.refresh().await.unwrap();
        repo.load_more().await.unwrap();
        assert_eq!(repo.images().len(), 5);

        repo.refresh().await.unwrap();
        assert_eq!(ids(&repo.images()), vec!["F"]);
        assert_eq!(repo.page(), 2);
        assert_eq!(source.pages(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_cursor_after_n_load_mores() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a"]));
        for i in 0..4 {
            let (first, second) = (format!("p{}-1", i), format!("p{}-2", i));
            source.push_ok(items(&[first.as_str(), second.as_str()]));
        }
        let mut repo = repo(&source);

        repo.refresh().await.unwrap();
        for _ in 0..4 {
            repo.load_more().await.unwrap();
        }

        assert_eq!(repo.page(), 2 + 4);
        assert_eq!(repo.images().len(), 1 + 4 * 2);
        assert_eq!(source.pages(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_failed_load_more_retries_same_page() {
        let source = Arc::new(ScriptedSource::new());
        source
            .push_ok(items(&["a"]))
            .push_err(transport_error())
            .push_ok(items(&["b"]));
        let mut repo = repo(&source);

        repo.refresh().await.unwrap();
        assert!(repo.load_more().await.is_err());
        repo.load_more().await.unwrap();

        assert_eq!(source.pages(), vec![1, 2, 2]);
        assert_eq!(repo.page(), 3);
        assert_eq!(ids(&repo.images()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_state() {
        let source = Arc::new(ScriptedSource::new());
        source
            .push_ok(items(&["a", "b"]))
            .push_ok(items(&["c"]))
            .push_err(SplashError::Decode("truncated".into()));
        let mut repo = repo(&source);

        repo.refresh().await.unwrap();
        repo.load_more().await.unwrap();

        let err = repo.refresh().await.unwrap_err();
        assert!(!err.is_transport());
        assert_eq!(ids(&repo.images()), vec!["a", "b", "c"]);
        assert_eq!(repo.page(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_publish() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a"])).push_ok(items(&["b"]));
        let mut repo = repo(&source);
        let mut rx = repo.subscribe();

        repo.refresh().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(ids(&rx.borrow_and_update()), vec!["a"]);

        repo.load_more().await.unwrap();
        assert_eq!(ids(&rx.borrow_and_update()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_restore_publishes_without_moving_cursor() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["x"]));
        let mut repo = repo(&source);
        let rx = repo.subscribe();

        assert!(repo.restore(items(&["r1", "r2"])));
        assert!(repo.restore(items(&["r1", "r2"])));
        assert_eq!(ids(&rx.borrow()), vec!["r1", "r2"]);
        assert_eq!(repo.page(), DEFAULT_PAGE);
        assert!(source.calls().is_empty());

        repo.refresh().await.unwrap();
        assert_eq!(ids(&repo.images()), vec!["x"]);

        assert!(!repo.restore(items(&["late"])));
        assert_eq!(ids(&repo.images()), vec!["x"]);
    }

    #[tokio::test]
    async fn test_load_more_after_restore_replaces_restored_list() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(items(&["a", "b"])).push_ok(items(&["c"]));
        let mut repo = repo(&source);

        repo.restore(items(&["a", "b", "c", "d"]));
        assert_eq!(repo.load_more().await.unwrap(), 2);
        assert_eq!(ids(&repo.images()), vec!["a", "b"]);
        assert_eq!(repo.page(), 2);

        repo.load_more().await.unwrap();
        assert_eq!(ids(&repo.images()), vec!["a", "b", "c"]);
        assert_eq!(source.pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_keyword_changes_query() {
        let source = Arc::new(ScriptedSource::new());
        let mut repo = ImageRepo::new(FeedVariant::search(None), deps(source.clone()));

        assert_eq!(repo.refresh().await.unwrap(), 0);
        assert!(source.calls().is_empty());

        repo.set_keyword("mountains").unwrap();
        repo.refresh().await.unwrap();
        repo.load_more().await.unwrap();

        let keywords: Vec<_> = source.calls().into_iter().map(|c| c.keyword).collect();
        assert_eq!(keywords, vec![Some("mountains".to_string()), Some("mountains".to_string())]);
    }

    #[test]
    fn test_set_keyword_on_plain_feed_fails() {
        let source = Arc::new(ScriptedSource::new());
        let mut repo = repo(&source);
        assert!(matches!(
            repo.set_keyword("x"),
            Err(SplashError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_refresh_never_publishes() {
        let mut repo = ImageRepo::new(FeedVariant::Random, deps(Arc::new(PendingSource)));
        let rx = repo.subscribe();

        {
            let mut refresh = task::spawn(repo.refresh());
            assert_pending!(refresh.poll());
        }

        assert!(!rx.has_changed().unwrap());
        assert!(repo.images().is_empty());
        assert_eq!(repo.page(), DEFAULT_PAGE);
    }
}
