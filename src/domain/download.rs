use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentItem;

/// Which surface asked for the download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadOrigin {
    List,
    Widget,
}

impl DownloadOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadOrigin::List => "list",
            DownloadOrigin::Widget => "widget",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "widget" => DownloadOrigin::Widget,
            _ => DownloadOrigin::List,
        }
    }
}

/// Request handed to the download manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
    pub preview_path: Option<PathBuf>,
    pub origin: DownloadOrigin,
}

impl DownloadRequest {
    /// Full-size download of `item`, or `None` when it has no download URL.
    pub fn for_item(
        item: &ContentItem,
        origin: DownloadOrigin,
        preview_path: Option<PathBuf>,
    ) -> Option<Self> {
        let url = item.download_url.clone()?;
        Some(Self {
            url,
            file_name: item.file_name.clone(),
            preview_path,
            origin,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Pending,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DownloadStatus::Pending),
            "completed" | "done" => Ok(DownloadStatus::Completed),
            "failed" => Ok(DownloadStatus::Failed),
            other => Err(format!("Unknown download status: {}", other)),
        }
    }
}

/// A persisted download entry.
#[derive(Debug, Clone)]
pub struct DownloadRecord {
    pub id: i64,
    pub url: String,
    pub file_name: String,
    pub preview_path: Option<PathBuf>,
    pub origin: DownloadOrigin,
    pub status: DownloadStatus,
    pub created_at: DateTime<Utc>,
}
