//! Tests for claiming jobs from the in-process queue
//!
//! next_job_in_queue() must:
//! - hand out jobs in the order they were queued
//! - hold back jobs while every semaphore permit is taken
//! - report a closed queue once all senders are gone

use std::sync::Arc;
use std::time::Duration;

use data_model_smap::SitemapJobPayload;
use tokio::sync::Semaphore;
use worker_smap::{Error, enqueue, job_queue, next_job_in_queue};

#[tokio::test]
async fn test_next_job_in_queue_is_fifo() {
    let (sender, mut receiver) = job_queue(8);
    let semaphore = Arc::new(Semaphore::new(4));

    let first = enqueue(&sender, SitemapJobPayload::new("biology", "biology")).await.unwrap();
    let second = enqueue(&sender, SitemapJobPayload::new("history", "history")).await.unwrap();

    let (item, _permit) = next_job_in_queue(&mut receiver, semaphore.clone()).await.unwrap();
    assert_eq!(item.job_id, first);
    assert_eq!(item.payload.sitemap.as_deref(), Some("biology"));

    let (item, _permit) = next_job_in_queue(&mut receiver, semaphore.clone()).await.unwrap();
    assert_eq!(item.job_id, second);
}

#[tokio::test]
async fn test_permit_is_held_with_the_job() {
    let (sender, mut receiver) = job_queue(8);
    let semaphore = Arc::new(Semaphore::new(1));
    enqueue(&sender, SitemapJobPayload::new("a", "a")).await.unwrap();
    enqueue(&sender, SitemapJobPayload::new("b", "b")).await.unwrap();

    let (_item, permit) = next_job_in_queue(&mut receiver, semaphore.clone()).await.unwrap();
    assert_eq!(semaphore.available_permits(), 0);

    // The second job waits for the permit of the first one.
    let blocked = tokio::time::timeout(
        Duration::from_millis(50),
        next_job_in_queue(&mut receiver, semaphore.clone()),
    )
    .await;
    assert!(blocked.is_err());

    drop(permit);
    let (item, _permit) = next_job_in_queue(&mut receiver, semaphore.clone()).await.unwrap();
    assert_eq!(item.payload.sitemap.as_deref(), Some("b"));
}

#[tokio::test]
async fn test_closed_queue_returns_permit() {
    let (sender, mut receiver) = job_queue(1);
    drop(sender);
    let semaphore = Arc::new(Semaphore::new(1));

    let result = next_job_in_queue(&mut receiver, semaphore.clone()).await;
    assert!(matches!(result, Err(Error::QueueClosed)));
    assert_eq!(semaphore.available_permits(), 1);
}

#[tokio::test]
async fn test_closed_semaphore_is_an_error() {
    let (_sender, mut receiver) = job_queue(1);
    let semaphore = Arc::new(Semaphore::new(1));
    semaphore.close();

    let result = next_job_in_queue(&mut receiver, semaphore).await;
    assert!(matches!(result, Err(Error::SemaphorePermitError(_))));
}
