pub mod download;
pub mod feed;
pub mod highlight;
pub mod image;
pub mod state;

pub use download::{DownloadOrigin, DownloadRecord, DownloadRequest, DownloadStatus};
pub use feed::FeedKind;
pub use highlight::HighlightWindow;
pub use image::{ContentItem, Sponsorship};
pub use state::WidgetState;
