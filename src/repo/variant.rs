use std::sync::Arc;

use tracing::debug;

use crate::app::{Result, SplashError};
use crate::config::preferences::SHOW_SPONSORSHIP;
use crate::config::Preferences;
use crate::domain::{ContentItem, FeedKind, HighlightWindow};
use crate::fetcher::ContentSource;

/// Collaborators a feed needs to load a page.
#[derive(Clone)]
pub struct FeedDeps {
    pub source: Arc<dyn ContentSource + Send + Sync>,
    pub prefs: Arc<dyn Preferences + Send + Sync>,
}

impl FeedDeps {
    pub fn new(
        source: Arc<dyn ContentSource + Send + Sync>,
        prefs: Arc<dyn Preferences + Send + Sync>,
    ) -> Self {
        Self { source, prefs }
    }
}

/// The strategy behind one photo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedVariant {
    New,
    Random,
    Developer,
    Search { keyword: Option<String> },
    Highlights(HighlightWindow),
}

impl FeedVariant {
    pub fn search(keyword: Option<String>) -> Self {
        FeedVariant::Search { keyword }
    }

    /// Build a non-search variant from its CLI name.
    pub fn from_name(name: &str, window: &HighlightWindow) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "new" => Ok(FeedVariant::New),
            "random" => Ok(FeedVariant::Random),
            "developer" => Ok(FeedVariant::Developer),
            "highlights" => Ok(FeedVariant::Highlights(window.clone())),
            other => Err(SplashError::Config(format!("Unknown feed: {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeedVariant::New => "new",
            FeedVariant::Random => "random",
            FeedVariant::Developer => "developer",
            FeedVariant::Search { .. } => "search",
            FeedVariant::Highlights(_) => "highlights",
        }
    }

    /// Key under which the list is persisted between runs.
    pub fn snapshot_key(&self) -> String {
        match self.keyword() {
            Some(keyword) => format!("search:{}", keyword.to_lowercase()),
            None => self.name().to_string(),
        }
    }

    /// Effective search keyword; blank keywords count as unset.
    pub fn keyword(&self) -> Option<&str> {
        match self {
            FeedVariant::Search { keyword } => {
                keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
            }
            _ => None,
        }
    }

    /// Load one page of this feed.
    pub async fn load_data(&self, deps: &FeedDeps, page: u32) -> Result<Vec<ContentItem>> {
        match self {
            FeedVariant::New => {
                let mut items = deps.source.fetch_page(FeedKind::New, page, None).await?;
                if !deps.prefs.get_bool(SHOW_SPONSORSHIP, true) {
                    items.retain(|item| !item.is_sponsored());
                }
                Ok(items)
            }
            FeedVariant::Random => deps.source.fetch_page(FeedKind::Random, page, None).await,
            FeedVariant::Developer => {
                deps.source
                    .fetch_page(FeedKind::Developer, page, None)
                    .await
            }
            FeedVariant::Search { .. } => match self.keyword() {
                Some(keyword) => {
                    deps.source
                        .fetch_page(FeedKind::Search, page, Some(keyword))
                        .await
                }
                None => {
                    debug!(page, "search has no keyword");
                    Ok(Vec::new())
                }
            },
            FeedVariant::Highlights(window) => {
                let items = window.items();
                if !window.delay.is_zero() {
                    tokio::time::sleep(window.delay).await;
                }
                Ok(items)
            }
        }
    }
}
