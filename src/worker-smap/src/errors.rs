use std::time::Duration;

use data_model_smap::TargetsError;
use tokio::sync::AcquireError;

#[derive(Debug)]
pub enum Error {
    JobFailed(core_smap::Error),
    Timeout(Duration),
    TargetsError(TargetsError),
    QueueClosed,
    SemaphorePermitError(AcquireError),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JobFailed(core_error) => write!(f, "{}", core_error),
            Self::Timeout(limit) => write!(f, "Sitemap job did not finish within {:?}", limit),
            Self::TargetsError(targets_error) => write!(f, "Sitemap targets error: {}", targets_error),
            Self::QueueClosed => write!(f, "Job queue is closed."),
            Self::SemaphorePermitError(acquire_error) => {
                write!(f, "Failed to acquire semaphore permit: {}", acquire_error)
            }
        }
    }
}

impl From<core_smap::Error> for Error {
    fn from(error: core_smap::Error) -> Self {
        Self::JobFailed(error)
    }
}

impl From<TargetsError> for Error {
    fn from(error: TargetsError) -> Self {
        Self::TargetsError(error)
    }
}

impl From<AcquireError> for Error {
    fn from(error: AcquireError) -> Self {
        Self::SemaphorePermitError(error)
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::QueueClosed
    }
}
