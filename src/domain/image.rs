use serde::{Deserialize, Serialize};
use url::Url;

/// Marker attached to paid placements in the new-photos feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sponsorship {
    pub sponsor: Option<String>,
    pub tagline: Option<String>,
}

/// A remote photo as listed by a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    /// Browsing-resolution URL, also the input of the cache key
    pub list_url: Option<String>,
    /// Full-resolution URL used for downloads
    pub download_url: Option<String>,
    pub file_name: String,
    pub sponsorship: Option<Sponsorship>,
    pub author: Option<String>,
    pub color: Option<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let file_name = Self::file_name_for(&id, None);
        Self {
            id,
            list_url: None,
            download_url: None,
            file_name,
            sponsorship: None,
            author: None,
            color: None,
        }
    }

    /// Suggested file name for a saved copy: `"{author} - {id}.jpg"`,
    /// or `"{id}.jpg"` when the author is unknown.
    pub fn file_name_for(id: &str, author: Option<&str>) -> String {
        match author.map(str::trim).filter(|a| !a.is_empty()) {
            Some(author) => {
                let author: String = author
                    .chars()
                    .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
                    .collect();
                format!("{} - {}.jpg", author, id)
            }
            None => format!("{}.jpg", id),
        }
    }

    pub fn is_sponsored(&self) -> bool {
        self.sponsorship.is_some()
    }

    /// The list URL if it is an absolute http(s) URL.
    pub fn usable_list_url(&self) -> Option<Url> {
        let raw = self.list_url.as_deref()?.trim();
        let url = Url::parse(raw).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(url)
    }

    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or("(unknown)")
    }
}
