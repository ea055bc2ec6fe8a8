use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::app::{AppContext, Result, SplashError};
use crate::cache::{cache_key, CacheStore};
use crate::cli::FeedArg;
use crate::domain::{ContentItem, DownloadOrigin, DownloadRequest, DownloadStatus};
use crate::download::DownloadManager;
use crate::repo::{FeedController, FeedVariant};
use crate::store::Store;
use crate::widget::daemon::{format_interval, parse_interval, DaemonConfig, WidgetDaemon};
use crate::widget::WidgetOutcome;

pub async fn show_feed(ctx: &AppContext, kind: FeedArg, pages: u32, fresh: bool) -> Result<()> {
    let window = ctx.config.highlights.window();
    let variant = FeedVariant::from_name(kind.name(), &window)?;
    let controller = Arc::new(ctx.controller(variant));

    if !fresh && controller.init().await? {
        let images = controller.images();
        println!("Restored {} photos from the last run (use --fresh to reload)", images.len());
        print_images(&images);
        return Ok(());
    }

    load_pages(&controller, pages).await
}

pub async fn search(ctx: &AppContext, keyword: &str, pages: u32) -> Result<()> {
    if keyword.trim().is_empty() {
        println!("Nothing to search for");
        return Ok(());
    }

    let controller = Arc::new(ctx.controller(FeedVariant::search(Some(keyword.to_string()))));
    load_pages(&controller, pages).await
}

async fn load_pages(controller: &Arc<FeedController>, pages: u32) -> Result<()> {
    let interrupt = close_on_ctrl_c(controller.clone());

    let result = async {
        controller.refresh().await?;
        for _ in 1..pages {
            if controller.load_more().await? == Some(0) {
                break;
            }
        }
        Ok::<_, SplashError>(())
    }
    .await;
    interrupt.abort();

    let images = controller.images();
    match result {
        Ok(()) => {}
        Err(SplashError::Cancelled) => println!("Interrupted"),
        Err(e) if images.is_empty() => return Err(e),
        Err(e) => eprintln!("Could not load more photos: {}", e),
    }

    if images.is_empty() {
        println!("No photos");
    } else {
        print_images(&images);
    }
    Ok(())
}

fn close_on_ctrl_c(controller: Arc<FeedController>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            controller.close();
        }
    })
}

fn print_images(images: &[ContentItem]) {
    for (i, image) in images.iter().enumerate() {
        let marker = if image.is_sponsored() { "$" } else { " " };
        println!(
            "{:>3}.{} {}  {}\n       {}",
            i + 1,
            marker,
            image.id,
            image.display_author(),
            image.list_url.as_deref().unwrap_or("(no preview)")
        );
    }
}

pub async fn widget_refresh(ctx: &AppContext) -> Result<()> {
    match ctx.widget().run().await {
        WidgetOutcome::Updated {
            image_id,
            path,
            cached,
        } => {
            let source = if cached { "cache" } else { "network" };
            println!("Widget now shows {} ({}, from {})", image_id, path.display(), source);
        }
        WidgetOutcome::Skipped(reason) => println!("Widget not updated: {}", reason),
        WidgetOutcome::Abandoned(reason) => eprintln!("Widget refresh failed: {}", reason),
    }
    Ok(())
}

pub async fn widget_run(
    ctx: &AppContext,
    interval: Option<&str>,
    no_initial_update: bool,
) -> Result<()> {
    let interval_secs = match interval {
        Some(s) => parse_interval(s).map_err(SplashError::Config)?,
        None => ctx
            .config
            .widget
            .interval_secs()
            .map_err(|e| SplashError::Config(e.to_string()))?,
    };

    println!(
        "Refreshing the widget every {} (Ctrl-C to stop)",
        format_interval(interval_secs)
    );

    let daemon = WidgetDaemon::new(
        Arc::new(ctx.widget()),
        DaemonConfig {
            interval_secs,
            update_on_start: !no_initial_update,
        },
    );
    let cycles = daemon.run().await;
    println!("Stopped after {} refreshes", cycles);
    Ok(())
}

pub fn widget_status(ctx: &AppContext) -> Result<()> {
    match ctx.store.get_widget_state()? {
        Some(state) => {
            println!("Image:    {}", state.image_id);
            println!("File:     {}", state.file_path.display());
            if let Some(url) = state.download_url {
                println!("Download: {}", url);
            }
            println!(
                "Updated:  {}",
                state.updated_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            );
        }
        None => println!("The widget has not been refreshed yet"),
    }
    Ok(())
}

pub fn list_downloads(ctx: &AppContext) -> Result<()> {
    let records = ctx.store.get_downloads()?;

    if records.is_empty() {
        println!("No downloads");
        return Ok(());
    }

    for record in records {
        println!(
            "{:>4} {:<9} {} {}  ({})",
            record.id,
            record.status.as_str(),
            record.created_at.format("%Y-%m-%d"),
            record.file_name,
            record.origin.as_str()
        );
    }

    Ok(())
}

pub fn clear_downloads(ctx: &AppContext, status: Option<DownloadStatus>) -> Result<()> {
    let statuses = match status {
        Some(status) => vec![status],
        None => vec![
            DownloadStatus::Pending,
            DownloadStatus::Completed,
            DownloadStatus::Failed,
        ],
    };

    let mut deleted = 0;
    for status in statuses {
        deleted += ctx.store.delete_downloads_by_status(status)?;
    }

    println!("Removed {} download records", deleted);
    Ok(())
}

pub async fn download_photo(ctx: &AppContext, kind: FeedArg, id: &str) -> Result<()> {
    let window = ctx.config.highlights.window();
    let controller = ctx.controller(FeedVariant::from_name(kind.name(), &window)?);
    if !controller.init().await? {
        controller.refresh().await?;
    }

    let Some(item) = controller.find(id) else {
        println!("No photo {} in the {} feed", id, kind.name());
        return Ok(());
    };

    let mut preview = None;
    if let Some(url) = item.usable_list_url() {
        let key = cache_key(url.as_str());
        if ctx.cache.exists(&key).await {
            preview = Some(ctx.cache.path_for(&key));
        }
    }

    let Some(request) = DownloadRequest::for_item(&item, DownloadOrigin::List, preview) else {
        println!("{} has no download url", id);
        return Ok(());
    };
    let url = request.url.clone();
    ctx.downloads.enqueue(request);

    // The worker records and finishes the download before it stops.
    ctx.shutdown().await;

    let record = ctx
        .store
        .get_downloads()?
        .into_iter()
        .find(|r| r.url == url);
    match record {
        Some(record) => println!("{:>4} {} {}", record.id, record.status, record.file_name),
        None => eprintln!("Download of {} was not recorded", id),
    }
    Ok(())
}

pub async fn retry_downloads(ctx: &AppContext, ids: &[i64]) -> Result<()> {
    let mut known = Vec::new();
    for &id in ids {
        match ctx.store.get_download(id)? {
            Some(record) => known.push(record.id),
            None => eprintln!("No download with id {}", id),
        }
    }

    let results = join_all(known.iter().map(|&id| ctx.downloads.retry(id))).await;
    for result in results {
        result?;
    }

    // Queued retries finish before the worker stops.
    ctx.shutdown().await;

    for id in known {
        if let Some(record) = ctx.store.get_download(id)? {
            println!("{:>4} {}", record.id, record.status);
        }
    }
    Ok(())
}

pub fn delete_downloads(ctx: &AppContext, ids: &[i64]) -> Result<()> {
    let mut deleted = 0;
    for &id in ids {
        if ctx.store.delete_download(id)? {
            deleted += 1;
        } else {
            eprintln!("No download with id {}", id);
        }
    }

    println!("Removed {} download records", deleted);
    Ok(())
}
