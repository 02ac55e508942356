use std::time::Duration;

use core_smap::config::{ConfigError, positive};

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_JOB_TIMEOUT_S: u64 = 900;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 600;
pub const DEFAULT_DISPATCH_INTERVAL_S: u64 = 86_400;
/// Jobs that can wait in the queue before the dispatcher blocks.
pub const QUEUE_CAPACITY: usize = 256;

/// Scheduling knobs of the worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Sitemap jobs running at once.
    pub max_concurrency: usize,
    /// Upper bound for a single sitemap job, paging and writing included.
    pub job_timeout: Duration,
    /// Pause between queue polls.
    pub poll_interval: Duration,
    /// Pause between two dispatches of every configured target.
    pub dispatch_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_S),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            dispatch_interval: Duration::from_secs(DEFAULT_DISPATCH_INTERVAL_S),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &'static str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            max_concurrency: positive(
                "WORKER_MAX_CONCURRENCY",
                value("WORKER_MAX_CONCURRENCY"),
                DEFAULT_MAX_CONCURRENCY,
            )?,
            job_timeout: Duration::from_secs(positive(
                "WORKER_JOB_TIMEOUT_S",
                value("WORKER_JOB_TIMEOUT_S"),
                DEFAULT_JOB_TIMEOUT_S,
            )?),
            poll_interval: Duration::from_millis(positive(
                "WORKER_POLL_INTERVAL_MS",
                value("WORKER_POLL_INTERVAL_MS"),
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            dispatch_interval: Duration::from_secs(positive(
                "DISPATCH_INTERVAL_S",
                value("DISPATCH_INTERVAL_S"),
                DEFAULT_DISPATCH_INTERVAL_S,
            )?),
        })
    }
}
