pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{ContentItem, FeedKind};

/// Remote listing of photos, one page at a time.
#[async_trait]
pub trait ContentSource {
    /// `keyword` is only meaningful for [`FeedKind::Search`].
    async fn fetch_page(
        &self,
        kind: FeedKind,
        page: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<ContentItem>>;
}

/// Raw download of a single resource.
#[async_trait]
pub trait ByteFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
