//! In-process job queue between the dispatcher and the worker loop.

use chrono::{DateTime, Utc};
use data_model_smap::SitemapJobPayload;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::errors::Error;

/// One queued sitemap job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub job_id: Uuid,
    pub payload: SitemapJobPayload,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn new(payload: SitemapJobPayload) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            payload,
            enqueued_at: Utc::now(),
        }
    }
}

pub type JobSender = mpsc::Sender<QueueItem>;
pub type JobReceiver = mpsc::Receiver<QueueItem>;

/// A bounded FIFO queue; senders wait once `capacity` jobs are pending.
pub fn job_queue(capacity: usize) -> (JobSender, JobReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Queues `payload` and returns the id of the new job.
pub async fn enqueue(sender: &JobSender, payload: SitemapJobPayload) -> Result<Uuid, Error> {
    let item = QueueItem::new(payload);
    let job_id = item.job_id;
    sender.send(item).await?;
    Ok(job_id)
}
