use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the home-screen widget currently shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetState {
    pub image_id: String,
    pub file_path: PathBuf,
    pub download_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl WidgetState {
    pub fn new(image_id: String, file_path: PathBuf, download_url: Option<String>) -> Self {
        Self {
            image_id,
            file_path,
            download_url,
            updated_at: Utc::now(),
        }
    }
}
