use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::app::{Result, SplashError};
use crate::config::ApiConfig;
use crate::domain::{ContentItem, FeedKind};
use crate::fetcher::{ByteFetcher, ContentSource};
use crate::normalizer::Normalizer;

/// reqwest-backed client for the photo API and for raw image downloads.
pub struct HttpFetcher {
    client: Client,
    config: ApiConfig,
    normalizer: Normalizer,
}

impl HttpFetcher {
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("splashfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");
        let normalizer = Normalizer::new(config.browsing_quality, config.download_quality);

        Self {
            client,
            config,
            normalizer,
        }
    }

    /// Build the endpoint URL for one page of a feed.
    pub fn page_url(&self, kind: FeedKind, page: u32, keyword: Option<&str>) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let per_page = self.config.per_page.to_string();
        let page = page.to_string();

        let mut params: Vec<(&str, &str)> = Vec::new();
        let path = match kind {
            FeedKind::New => {
                params.push(("page", page.as_str()));
                params.push(("per_page", per_page.as_str()));
                "photos".to_string()
            }
            FeedKind::Random => {
                params.push(("count", per_page.as_str()));
                "photos/random".to_string()
            }
            FeedKind::Developer => {
                params.push(("page", page.as_str()));
                params.push(("per_page", per_page.as_str()));
                format!("collections/{}/photos", self.config.developer_collection)
            }
            FeedKind::Search => {
                params.push(("query", keyword.unwrap_or_default()));
                params.push(("page", page.as_str()));
                params.push(("per_page", per_page.as_str()));
                "search/photos".to_string()
            }
        };
        if !self.config.client_id.is_empty() {
            params.push(("client_id", self.config.client_id.as_str()));
        }

        Ok(Url::parse_with_params(&format!("{}/{}", base, path), &params)?)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SplashError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[async_trait]
impl ContentSource for HttpFetcher {
    async fn fetch_page(
        &self,
        kind: FeedKind,
        page: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<ContentItem>> {
        let url = self.page_url(kind, page, keyword)?;
        debug!(feed = %kind, page, "fetching page");

        let body = self.get(url).await?;
        match kind {
            FeedKind::Search => self.normalizer.search(&body),
            _ => self.normalizer.photos(&body),
        }
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)?;
        self.get(url).await
    }
}
