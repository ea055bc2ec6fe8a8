pub mod sqlite;

use crate::app::Result;
use crate::domain::{ContentItem, DownloadRecord, DownloadRequest, DownloadStatus, WidgetState};

pub use sqlite::SqliteStore;

pub trait Store {
    // Feed snapshots
    fn save_snapshot(&self, feed_key: &str, items: &[ContentItem]) -> Result<()>;
    fn load_snapshot(&self, feed_key: &str) -> Result<Option<Vec<ContentItem>>>;
    fn clear_snapshot(&self, feed_key: &str) -> Result<()>;

    // Download operations
    fn add_download(&self, request: &DownloadRequest) -> Result<i64>;
    fn get_download(&self, id: i64) -> Result<Option<DownloadRecord>>;
    fn get_downloads(&self) -> Result<Vec<DownloadRecord>>;
    fn set_download_status(&self, id: i64, status: DownloadStatus) -> Result<()>;
    /// Returns whether a record was removed.
    fn delete_download(&self, id: i64) -> Result<bool>;
    fn delete_downloads_by_status(&self, status: DownloadStatus) -> Result<usize>;

    // Widget display state
    fn save_widget_state(&self, state: &WidgetState) -> Result<()>;
    fn get_widget_state(&self) -> Result<Option<WidgetState>>;
}
