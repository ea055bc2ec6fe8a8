//! Remote photo API settings.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Size variant picked from the URLs the API returns for each photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Raw,
    Full,
    Regular,
    Small,
    Thumb,
}

/// Connection and paging settings for the photo API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Access key sent as `client_id`
    pub client_id: String,
    pub per_page: u32,
    /// Collection backing the developer feed
    pub developer_collection: String,
    pub timeout_secs: u64,
    /// Variant used for browsing and the widget cache
    pub browsing_quality: ImageQuality,
    /// Variant used for downloads
    pub download_quality: ImageQuality,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            per_page: DEFAULT_PER_PAGE,
            developer_collection: "1288815".to_string(),
            timeout_secs: 10,
            browsing_quality: ImageQuality::Regular,
            download_quality: ImageQuality::Full,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
