use std::sync::Arc;

use core_smap::{get_config, live_job, setup_logging};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use worker_smap::config::QUEUE_CAPACITY;
use worker_smap::{Error, WorkerConfig, job_queue, next_job_in_queue, process_sitemap_job, run_dispatcher};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file., if it exists
    dotenvy::dotenv().ok();

    setup_logging("worker_smap=debug,core_smap=debug");

    let config = get_config();
    let worker_config =
        WorkerConfig::from_env().unwrap_or_else(|e| panic!("Invalid worker configuration: {}", e));
    let job = Arc::new(live_job(&config).unwrap_or_else(|e| panic!("Couldn't set up sitemap clients: {}", e)));

    tracing::info!(
        "Sitemap worker started: {} concurrent jobs, writing to {}, dispatching every {:?}",
        worker_config.max_concurrency,
        config.public_dir.display(),
        worker_config.dispatch_interval
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested, cancelling in-flight sitemap jobs");
                cancel.cancel();
            }
        }
    });

    let (sender, mut receiver) = job_queue(QUEUE_CAPACITY);
    tokio::spawn({
        let targets_file = config.targets_file.clone();
        let interval = worker_config.dispatch_interval;
        let cancel = cancel.clone();
        async move { run_dispatcher(sender, &targets_file, interval, cancel).await }
    });

    let semaphore = Arc::new(Semaphore::new(worker_config.max_concurrency));

    // Worker loop
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = next_job_in_queue(&mut receiver, semaphore.clone()) => next,
        };

        match next {
            Ok((item, permit)) => {
                let _ = tokio::spawn({
                    let job = job.clone();
                    let cancel = cancel.clone();
                    let timeout = worker_config.job_timeout;
                    async move {
                        if let Err(error) = process_sitemap_job(job.as_ref(), &item, timeout, &cancel).await {
                            tracing::error!(
                                "[SKIP] Sitemap job {} failed (sitemap {:?} - filter {:?}): {}",
                                item.job_id,
                                item.payload.sitemap,
                                item.payload.filter,
                                error
                            );
                        }
                        drop(permit);
                    }
                });
            }
            Err(Error::QueueClosed) => {
                tracing::info!("Job queue closed");
                break;
            }
            Err(error) => {
                tracing::error!("[SKIP] Error getting next job from queue: {}", error);
                tracing::debug!("Waiting to poll for next job");
                tokio::time::sleep(worker_config.poll_interval).await;
            }
        }
    }

    // Every permit back means every spawned job has finished.
    let in_flight = u32::try_from(worker_config.max_concurrency).unwrap_or(u32::MAX);
    if semaphore.acquire_many(in_flight).await.is_ok() {
        tracing::info!("All sitemap jobs finished, exiting");
    }
}
