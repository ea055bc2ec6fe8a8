use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use splashfeed::app::AppContext;
use splashfeed::cli::{commands, Cli, Commands, DownloadsAction, WidgetAction};
use splashfeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Feed { kind, pages, fresh } => {
            commands::show_feed(&ctx, kind, pages, fresh).await?;
        }
        Commands::Search { keyword, pages } => {
            commands::search(&ctx, &keyword, pages).await?;
        }
        Commands::Widget { action } => match action {
            WidgetAction::Refresh => commands::widget_refresh(&ctx).await?,
            WidgetAction::Run {
                interval,
                no_initial_update,
            } => commands::widget_run(&ctx, interval.as_deref(), no_initial_update).await?,
            WidgetAction::Status => commands::widget_status(&ctx)?,
        },
        Commands::Downloads { action } => match action {
            DownloadsAction::List => commands::list_downloads(&ctx)?,
            DownloadsAction::Clear { status } => commands::clear_downloads(&ctx, status)?,
            DownloadsAction::Add { id, feed } => commands::download_photo(&ctx, feed, &id).await?,
            DownloadsAction::Retry { ids } => commands::retry_downloads(&ctx, &ids).await?,
            DownloadsAction::Delete { ids } => commands::delete_downloads(&ctx, &ids)?,
        },
    }

    ctx.shutdown().await;
    Ok(())
}
