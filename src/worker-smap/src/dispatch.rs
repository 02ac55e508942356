//! Periodic dispatch of every configured sitemap target.

use std::path::Path;
use std::time::Duration;

use data_model_smap::SitemapTargets;
use tokio_util::sync::CancellationToken;

use crate::errors::Error;
use crate::queue::{JobSender, enqueue};

/// Queues one job per target. Returns how many were queued.
pub async fn enqueue_targets(sender: &JobSender, targets: &SitemapTargets) -> Result<usize, Error> {
    let mut queued = 0;
    for payload in targets.payloads() {
        let job_id = enqueue(sender, payload.clone()).await?;
        tracing::debug!(
            "[job: {}] Queued sitemap {:?} with filter {:?}",
            job_id,
            payload.sitemap,
            payload.filter
        );
        queued += 1;
    }
    Ok(queued)
}

/// Reloads and validates the targets file, then queues all of its targets.
pub async fn dispatch_targets_file(sender: &JobSender, targets_file: &Path) -> Result<usize, Error> {
    let targets = SitemapTargets::load(targets_file)?;
    enqueue_targets(sender, &targets).await
}

/// Dispatches every `interval`, starting immediately, until `cancel` fires or the queue closes.
/// A targets file that fails to load only skips that cycle.
pub async fn run_dispatcher(sender: JobSender, targets_file: &Path, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dispatcher stopped");
                return;
            }
            _ = ticker.tick() => {}
        }

        tracing::info!("Dispatching sitemap targets from {}", targets_file.display());
        match dispatch_targets_file(&sender, targets_file).await {
            Ok(n) => tracing::info!("Queued {} sitemap jobs", n),
            Err(Error::QueueClosed) => {
                tracing::warn!("Job queue closed, stopping dispatcher");
                return;
            }
            Err(e) => tracing::error!("[SKIP] Dispatch cycle failed: {}", e),
        }
    }
}
