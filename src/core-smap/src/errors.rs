//! Error types for sitemap generation.

use thiserror::Error;

use crate::writer::WriteError;

/// Failure talking to one of the HTTP collaborators (search index or identifier resolver).
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid base URL
    #[error("Invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// Non-success HTTP status
    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    /// Body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Reasons a sitemap could not be generated or persisted.
#[derive(Debug, Error)]
pub enum Error {
    /// The search index could not be queried.
    #[error("Index not available: {0}")]
    IndexUnavailable(#[from] ClientError),

    /// The filter matched nothing, or nothing that could be turned into a URL.
    #[error("No results for {filter}")]
    EmptyResult { filter: String },

    /// Paging did not converge on the index's reported result count.
    #[error("Gave up after {pages} pages without covering the {total_count} results reported by the index")]
    PageLimitExceeded { pages: usize, total_count: u64 },

    /// The surrounding worker asked the job to stop.
    #[error("Sitemap generation was cancelled")]
    Cancelled,

    /// The sitemap file could not be written.
    #[error("Failed to write sitemap: {0}")]
    Write(#[from] WriteError),
}

impl Error {
    /// True for outcomes that mean "nothing to do" rather than "something broke".
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

/// Type alias for Result with the sitemap [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
