//! Tests for running queued sitemap jobs end to end against in-memory collaborators

use std::time::Duration;

use async_trait::async_trait;
use core_smap::mock::{MockIndex, MockResolver, sample_records, sample_url};
use core_smap::{AssemblerOptions, ClientError, IndexQuery, IndexQueryClient, JobOutcome, SitemapJob, SitemapWriter};
use data_model_smap::{ResultPage, SitemapJobPayload};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use worker_smap::{Error, QueueItem, process_sitemap_job, run_sitemap_job};

const TIMEOUT: Duration = Duration::from_secs(10);

fn job<C: IndexQueryClient>(index: C, root: &std::path::Path) -> SitemapJob<C, MockResolver> {
    SitemapJob::new(
        index,
        MockResolver::new(),
        SitemapWriter::new(root),
        AssemblerOptions::default(),
    )
}

/// An index that never answers in time.
struct StalledIndex;

#[async_trait]
impl IndexQueryClient for StalledIndex {
    async fn query(&self, _query: &IndexQuery) -> Result<ResultPage, ClientError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(ResultPage::default())
    }
}

#[tokio::test]
async fn test_process_sitemap_job_writes_file() {
    core_smap::setup_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let job = job(MockIndex::new(sample_records(3)), dir.path());
    let item = QueueItem::new(SitemapJobPayload::new("biology", "biology"));

    process_sitemap_job(&job, &item, TIMEOUT, &CancellationToken::new())
        .await
        .unwrap();

    let written = std::fs::read_to_string(dir.path().join("biology.txt")).unwrap();
    let expected: Vec<String> = (0..3).map(sample_url).collect();
    assert_eq!(written, expected.join("\n"));
}

#[tokio::test]
async fn test_missing_filter_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(MockIndex::new(sample_records(3)), dir.path());
    let item = QueueItem::new(SitemapJobPayload {
        sitemap: Some("biology".to_string()),
        filter: None,
    });

    process_sitemap_job(&job, &item, TIMEOUT, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(job.client().page_count(), 0);
    assert!(!dir.path().join("biology.txt").exists());
}

#[tokio::test]
async fn test_empty_result_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(MockIndex::empty(), dir.path());
    let item = QueueItem::new(SitemapJobPayload::new("biology", "biology"));

    process_sitemap_job(&job, &item, TIMEOUT, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!dir.path().join("biology.txt").exists());
}

#[tokio::test]
async fn test_index_failure_is_reported_to_the_queue() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(MockIndex::with_failure(), dir.path());
    let item = QueueItem::new(SitemapJobPayload::new("biology", "biology"));

    let result = process_sitemap_job(&job, &item, TIMEOUT, &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(Error::JobFailed(core_smap::Error::IndexUnavailable(_)))
    ));
}

#[tokio::test]
async fn test_cancelled_worker_fails_the_job() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(MockIndex::new(sample_records(3)), dir.path());
    let item = QueueItem::new(SitemapJobPayload::new("biology", "biology"));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run_sitemap_job(&job, &item, TIMEOUT, &cancel).await.unwrap();

    assert!(matches!(
        outcome,
        JobOutcome::Failed {
            error: core_smap::Error::Cancelled
        }
    ));
    assert!(!dir.path().join("biology.txt").exists());
}

#[tokio::test]
async fn test_job_timeout() {
    core_smap::setup_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let job = job(StalledIndex, dir.path());
    let item = QueueItem::new(SitemapJobPayload::new("biology", "biology"));
    let cancel = CancellationToken::new();

    let result = run_sitemap_job(&job, &item, Duration::from_millis(50), &cancel).await;

    assert!(matches!(result, Err(Error::Timeout(_))));
    // Only the job's own token is cancelled.
    assert!(!cancel.is_cancelled());
}

#[tokio::test]
async fn test_concurrent_jobs_write_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let job = std::sync::Arc::new(job(MockIndex::new(sample_records(5)), dir.path()));
    let cancel = CancellationToken::new();

    let handles: Vec<_> = ["biology", "history", "alldiscoverable"]
        .into_iter()
        .map(|name| {
            let job = job.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let item = QueueItem::new(SitemapJobPayload::new(name, name));
                process_sitemap_job(job.as_ref(), &item, TIMEOUT, &cancel).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for name in ["biology", "history", "alldiscoverable"] {
        let written = std::fs::read_to_string(dir.path().join(format!("{}.txt", name))).unwrap();
        assert_eq!(written.lines().count(), 5);
    }
}
