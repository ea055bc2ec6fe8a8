//! # splashfeed
//!
//! Paginated photo feeds with a locally cached wallpaper widget.
//!
//! ## Architecture
//!
//! ```text
//! ContentSource → FeedVariant → ImageRepo → FeedController → CLI
//!                                   ↘ WidgetRefresh → CacheStore → DisplaySink
//! ```
//!
//! - [`fetcher`]: HTTP client for the photo API
//! - [`repo`]: Page cursor, accumulated list and state publication
//! - [`widget`]: Random photo, cache check, time-bounded download
//! - [`store`]: SQLite persistence layer
//!
//! ## Quick Start
//!
//! ```bash
//! # Latest photos, two pages
//! splashfeed feed new --pages 2
//!
//! # Search
//! splashfeed search "snowy peaks"
//!
//! # Refresh the widget every 30 minutes
//! splashfeed widget run --interval 30m
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, fetcher, cache, download queue.
pub mod app;

/// On-disk image cache keyed by the SHA-256 of a photo's list URL.
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/splashfeed/config.toml`, supporting:
/// - API endpoint, key and image qualities
/// - Highlight window and widget timings
/// - Boolean preferences
pub mod config;

/// Core domain models.
///
/// - [`ContentItem`](domain::ContentItem): One photo as shown in a list
/// - [`HighlightWindow`](domain::HighlightWindow): Dated daily highlights
/// - [`DownloadRecord`](domain::DownloadRecord): Persisted download entry
pub mod domain;

/// Background downloads of full-size images.
pub mod download;

/// HTTP fetching.
///
/// - [`ContentSource`](fetcher::ContentSource): One page of photos
/// - [`ByteFetcher`](fetcher::ByteFetcher): Raw bytes of a single image
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Photo API JSON to [`ContentItem`](domain::ContentItem) conversion.
pub mod normalizer;

/// Paginated feeds.
pub mod repo;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Wallpaper widget refresh and its scheduler.
pub mod widget;

#[cfg(test)]
mod test_support;
