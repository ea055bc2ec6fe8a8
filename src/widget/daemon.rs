//! Scheduled widget refreshes.
//!
//! Runs the widget flow on a fixed interval until interrupted. A failed
//! cycle is only logged; the next tick is the retry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::widget::{WidgetOutcome, WidgetRefresh};

/// Parse interval string like "1h", "30m", "6h", "1d"
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let secs = if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .map(|h| h * 3600)
            .map_err(|_| format!("Invalid hours: {}", hours))?
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .parse::<u64>()
            .map(|m| m * 60)
            .map_err(|_| format!("Invalid minutes: {}", minutes))?
    } else if let Some(days) = s.strip_suffix('d') {
        days.parse::<u64>()
            .map(|d| d * 86400)
            .map_err(|_| format!("Invalid days: {}", days))?
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| format!("Invalid seconds: {}", secs))?
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s))?
    };

    if secs == 0 {
        return Err("Interval must be greater than zero".to_string());
    }
    Ok(secs)
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub interval_secs: u64,
    /// Whether to refresh immediately on start
    pub update_on_start: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            update_on_start: true,
        }
    }
}

pub struct WidgetDaemon {
    refresh: Arc<WidgetRefresh>,
    config: DaemonConfig,
}

impl WidgetDaemon {
    pub fn new(refresh: Arc<WidgetRefresh>, config: DaemonConfig) -> Self {
        Self { refresh, config }
    }

    /// Run until Ctrl-C.
    pub async fn run(&self) -> usize {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` resolves. Returns the number of cycles run.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        info!(
            interval = %format_interval(self.config.interval_secs),
            "widget daemon started"
        );

        let mut cycles = 0;
        if self.config.update_on_start {
            self.cycle().await;
            cycles += 1;
        }

        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("widget daemon shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.cycle().await;
                    cycles += 1;
                }
            }
        }

        cycles
    }

    async fn cycle(&self) {
        match self.refresh.run().await {
            WidgetOutcome::Updated { image_id, cached, .. } => {
                info!(id = %image_id, cached, "scheduled widget refresh done");
            }
            WidgetOutcome::Skipped(reason) => info!(%reason, "scheduled widget refresh skipped"),
            WidgetOutcome::Abandoned(reason) => {
                warn!(%reason, "scheduled widget refresh abandoned")
            }
        }
    }
}
