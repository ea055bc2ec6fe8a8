use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::ContentItem;

pub const DEFAULT_HIGHLIGHTS_COUNT: usize = 60;
pub const DEFAULT_HIGHLIGHTS_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_HIGHLIGHTS_BASE_URL: &str = "https://juniperphoton.dev/myersplash/wallpapers";

/// Fixed historical range of daily highlight wallpapers.
///
/// Iteration starts at `start` and walks back one day per step for `count`
/// steps. Only dates strictly after `end` produce an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: usize,
    /// Simulated latency applied by the highlights feed
    pub delay: Duration,
    pub base_url: String,
}

impl Default for HighlightWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2021, 12, 31).expect("valid start date"),
            end: NaiveDate::from_ymd_opt(2017, 3, 20).expect("valid end date"),
            count: DEFAULT_HIGHLIGHTS_COUNT,
            delay: DEFAULT_HIGHLIGHTS_DELAY,
            base_url: DEFAULT_HIGHLIGHTS_BASE_URL.to_string(),
        }
    }
}

impl HighlightWindow {
    /// Dates that yield an entry, most recent first.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.count);
        let mut current = Some(self.start);

        for _ in 0..self.count {
            let Some(date) = current else {
                break;
            };
            if date > self.end {
                dates.push(date);
            } else {
                debug!(%date, end = %self.end, "highlight date is not after the end boundary");
            }
            current = date.pred_opt();
        }

        dates
    }

    pub fn items(&self) -> Vec<ContentItem> {
        self.dates()
            .into_iter()
            .map(|date| self.item_for(date))
            .collect()
    }

    /// Synthesize the highlight entry for one day.
    pub fn item_for(&self, date: NaiveDate) -> ContentItem {
        let stamp = date.format("%Y%m%d").to_string();
        let base = self.base_url.trim_end_matches('/');

        let mut item = ContentItem::new(stamp.clone());
        item.list_url = Some(format!("{}/thumbs/{}.jpg", base, stamp));
        item.download_url = Some(format!("{}/{}.jpg", base, stamp));
        item
    }
}
