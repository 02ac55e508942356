use std::sync::Arc;
use std::time::Duration;

use core_smap::{IdentifierResolver, IndexQueryClient, JobOutcome, SitemapJob};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::errors::Error;
use crate::queue::{JobReceiver, QueueItem};

/// Wait for the next queued job.
/// The semaphore controls the maximum number of concurrent jobs that the worker can handle.
pub async fn next_job_in_queue(
    receiver: &mut JobReceiver,
    semaphore: Arc<Semaphore>,
) -> Result<(QueueItem, OwnedSemaphorePermit), Error> {
    // Acquire a permit before taking a job.
    // This will block if we've reached max_concurrency, leaving jobs in the queue.
    tracing::debug!("Acquiring semaphore before checking for new job.");
    let permit = semaphore.acquire_owned().await?;
    tracing::debug!("Semaphore permit acquired. Waiting for a queued job.");
    // NOTE: If we return an Err, we drop the permit, allowing another job to be worked on.

    match receiver.recv().await {
        Some(item) => Ok((item, permit)),
        None => Err(Error::QueueClosed),
    }
}

/// Runs the job under `timeout`. The job gets a child of `cancel`, so shutting the worker down
/// stops it at the next page boundary.
pub async fn run_sitemap_job<C, R>(
    job: &SitemapJob<C, R>,
    item: &QueueItem,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<JobOutcome, Error>
where
    C: IndexQueryClient,
    R: IdentifierResolver,
{
    let job_cancel = cancel.child_token();
    match tokio::time::timeout(timeout, job.run(item.job_id, &item.payload, &job_cancel)).await {
        Ok(outcome) => Ok(outcome),
        Err(_) => {
            job_cancel.cancel();
            tracing::error!("[job: {}] Timed out after {:?}", item.job_id, timeout);
            Err(Error::Timeout(timeout))
        }
    }
}

/// Reports a terminal state back to the queue: only a failed job is an error.
pub fn handle_outcome(item: &QueueItem, outcome: JobOutcome) -> Result<(), Error> {
    let waited = chrono::Utc::now().signed_duration_since(item.enqueued_at);
    match outcome {
        JobOutcome::Completed { path, url_count } => {
            tracing::info!(
                "[job: {}] Completed {} URLs -> {} (queued {}s before completion)",
                item.job_id,
                url_count,
                path.display(),
                waited.num_seconds()
            );
            Ok(())
        }
        JobOutcome::Skipped { reason } => {
            tracing::info!("[job: {}] Skipped: {}", item.job_id, reason);
            Ok(())
        }
        JobOutcome::Failed { error } => Err(error.into()),
    }
}

/// Queue entry point for one sitemap job.
pub async fn process_sitemap_job<C, R>(
    job: &SitemapJob<C, R>,
    item: &QueueItem,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), Error>
where
    C: IndexQueryClient,
    R: IdentifierResolver,
{
    tracing::info!(
        "Received job {} - sitemap {:?} filter {:?}",
        item.job_id,
        item.payload.sitemap,
        item.payload.filter
    );
    let outcome = run_sitemap_job(job, item, timeout, cancel).await?;
    handle_outcome(item, outcome)
}
