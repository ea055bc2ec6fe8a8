use serde::Deserialize;

use crate::app::{Result, SplashError};
use crate::config::ImageQuality;
use crate::domain::{ContentItem, Sponsorship};

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    raw: Option<String>,
    full: Option<String>,
    regular: Option<String>,
    small: Option<String>,
    thumb: Option<String>,
}

impl PhotoUrls {
    fn pick(&self, quality: ImageQuality) -> Option<&String> {
        match quality {
            ImageQuality::Raw => self.raw.as_ref(),
            ImageQuality::Full => self.full.as_ref(),
            ImageQuality::Regular => self.regular.as_ref(),
            ImageQuality::Small => self.small.as_ref(),
            ImageQuality::Thumb => self.thumb.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PhotoUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoSponsor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoSponsorship {
    sponsor: Option<PhotoSponsor>,
    tagline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    id: String,
    color: Option<String>,
    urls: Option<PhotoUrls>,
    user: Option<PhotoUser>,
    sponsorship: Option<PhotoSponsorship>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Option<Vec<Photo>>,
}

/// Turns API response bodies into [`ContentItem`]s.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    browsing: ImageQuality,
    download: ImageQuality,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ImageQuality::Regular, ImageQuality::Full)
    }
}

impl Normalizer {
    pub fn new(browsing: ImageQuality, download: ImageQuality) -> Self {
        Self { browsing, download }
    }

    /// Parse a JSON array of photos.
    pub fn photos(&self, body: &[u8]) -> Result<Vec<ContentItem>> {
        let photos: Vec<Photo> =
            serde_json::from_slice(body).map_err(|e| SplashError::Decode(e.to_string()))?;
        Ok(photos.into_iter().map(|p| self.convert(p)).collect())
    }

    /// Parse a search response; a missing result list is an empty page.
    pub fn search(&self, body: &[u8]) -> Result<Vec<ContentItem>> {
        let page: SearchPage =
            serde_json::from_slice(body).map_err(|e| SplashError::Decode(e.to_string()))?;
        Ok(page
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|p| self.convert(p))
            .collect())
    }

    fn convert(&self, photo: Photo) -> ContentItem {
        let author = photo.user.and_then(|u| u.name);
        let mut item = ContentItem::new(photo.id);

        item.file_name = ContentItem::file_name_for(&item.id, author.as_deref());
        if let Some(urls) = &photo.urls {
            item.list_url = urls.pick(self.browsing).cloned();
            item.download_url = urls
                .pick(self.download)
                .or(urls.full.as_ref())
                .or(urls.raw.as_ref())
                .cloned();
        }
        item.sponsorship = photo.sponsorship.map(|s| Sponsorship {
            sponsor: s.sponsor.and_then(|sp| sp.name),
            tagline: s.tagline,
        });
        item.author = author;
        item.color = photo.color;

        item
    }
}
