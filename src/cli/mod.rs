pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::DownloadStatus;

#[derive(Parser)]
#[command(name = "splashfeed")]
#[command(about = "Browse photo feeds and keep a wallpaper widget fresh", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/splashfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a photo feed
    Feed {
        #[arg(value_enum)]
        kind: FeedArg,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Ignore the list saved by the last run
        #[arg(long)]
        fresh: bool,
    },
    /// Search photos by keyword
    Search {
        keyword: String,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Wallpaper widget
    Widget {
        #[command(subcommand)]
        action: WidgetAction,
    },
    /// Downloaded images
    Downloads {
        #[command(subcommand)]
        action: DownloadsAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedArg {
    New,
    Random,
    Developer,
    Highlights,
}

impl FeedArg {
    pub fn name(self) -> &'static str {
        match self {
            FeedArg::New => "new",
            FeedArg::Random => "random",
            FeedArg::Developer => "developer",
            FeedArg::Highlights => "highlights",
        }
    }
}

#[derive(Subcommand)]
pub enum WidgetAction {
    /// Refresh the widget image once
    Refresh,
    /// Refresh the widget on a schedule until interrupted
    Run {
        /// Refresh interval (e.g., "30m", "1h", "1d"); defaults to the config value
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip the refresh on start
        #[arg(long)]
        no_initial_update: bool,
    },
    /// Show what the widget currently displays
    Status,
}

#[derive(Subcommand)]
pub enum DownloadsAction {
    /// List recorded downloads
    List,
    /// Delete download records
    Clear {
        /// Only clear records with this status (default: all)
        #[arg(short, long, value_parser = parse_status)]
        status: Option<DownloadStatus>,
    },
    /// Download the full-size image of a photo from a feed
    Add {
        /// Photo id as shown by `feed`
        id: String,

        /// Feed to look the photo up in
        #[arg(short, long, value_enum, default_value_t = FeedArg::New)]
        feed: FeedArg,
    },
    /// Download recorded entries again
    Retry {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Delete single download records
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

fn parse_status(s: &str) -> Result<DownloadStatus, String> {
    s.parse()
}
