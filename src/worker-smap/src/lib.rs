pub mod config;
pub mod dispatch;
pub mod errors;
pub mod queue;
pub mod work;

pub use config::WorkerConfig;
pub use errors::Error;

pub use dispatch::{dispatch_targets_file, enqueue_targets, run_dispatcher};
pub use queue::{JobReceiver, JobSender, QueueItem, enqueue, job_queue};
pub use work::{handle_outcome, next_job_in_queue, process_sitemap_job, run_sitemap_job};
