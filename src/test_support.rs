//! Fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::app::{Result, SplashError};
use crate::config::PreferenceTable;
use crate::domain::{ContentItem, FeedKind};
use crate::fetcher::{ByteFetcher, ContentSource};
use crate::repo::FeedDeps;

pub fn item(id: &str) -> ContentItem {
    let mut item = ContentItem::new(id);
    item.list_url = Some(format!("https://images.example.com/{}?w=1080", id));
    item.download_url = Some(format!("https://images.example.com/{}?full", id));
    item
}

pub fn items(ids: &[&str]) -> Vec<ContentItem> {
    ids.iter().map(|id| item(id)).collect()
}

pub fn transport_error() -> SplashError {
    SplashError::Status {
        url: "https://api.example.com/photos".into(),
        status: 503,
    }
}

/// Call recorded by [`ScriptedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCall {
    pub kind: FeedKind,
    pub page: u32,
    pub keyword: Option<String>,
}

/// Returns queued responses in order; an exhausted queue yields empty pages.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<ContentItem>>>>,
    calls: Mutex<Vec<SourceCall>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, items: Vec<ContentItem>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(items));
        self
    }

    pub fn push_err(&self, err: SplashError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pages(&self) -> Vec<u32> {
        self.calls().into_iter().map(|c| c.page).collect()
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch_page(
        &self,
        kind: FeedKind,
        page: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<ContentItem>> {
        self.calls.lock().unwrap().push(SourceCall {
            kind,
            page,
            keyword: keyword.map(String::from),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Never completes.
pub struct PendingSource;

#[async_trait]
impl ContentSource for PendingSource {
    async fn fetch_page(
        &self,
        _kind: FeedKind,
        _page: u32,
        _keyword: Option<&str>,
    ) -> Result<Vec<ContentItem>> {
        std::future::pending().await
    }
}

pub fn deps(source: Arc<dyn ContentSource + Send + Sync>) -> FeedDeps {
    FeedDeps::new(source, Arc::new(PreferenceTable::default()))
}

pub fn deps_with_prefs(
    source: Arc<dyn ContentSource + Send + Sync>,
    prefs: PreferenceTable,
) -> FeedDeps {
    FeedDeps::new(source, Arc::new(prefs))
}

/// Byte fetcher returning queued responses; an exhausted queue yields
/// a transport error.
#[derive(Default)]
pub struct ScriptedBytes {
    responses: Mutex<VecDeque<Result<Vec<u8>>>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedBytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, bytes: Vec<u8>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(bytes));
        self
    }

    pub fn push_err(&self, err: SplashError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ByteFetcher for ScriptedBytes {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.urls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error()))
    }
}

/// Byte fetcher that never completes.
pub struct PendingBytes;

#[async_trait]
impl ByteFetcher for PendingBytes {
    async fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>> {
        std::future::pending().await
    }
}
