use std::path::PathBuf;

use data_model_smap::{SitemapJobPayload, SitemapRequest, ValidationError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::assembler::{AssemblerOptions, assemble};
use crate::errors::Error;
use crate::index::IndexQueryClient;
use crate::resolver::IdentifierResolver;
use crate::writer::{SitemapWriter, WriteError};

/// Terminal state of one sitemap job.
#[derive(Debug)]
pub enum JobOutcome {
    /// The sitemap was written.
    Completed { path: PathBuf, url_count: usize },
    /// Nothing to do; no query or no write happened.
    Skipped { reason: SkipReason },
    /// The job broke; the queue may run it again.
    Failed { error: Error },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug)]
pub enum SkipReason {
    /// Required queue fields were missing.
    Invalid(ValidationError),
    /// The sitemap name cannot be used as a file name.
    InvalidName(WriteError),
    /// The filter matched no (resolvable) records.
    EmptyResult,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "{}", e),
            Self::InvalidName(e) => write!(f, "{}", e),
            Self::EmptyResult => write!(f, "no results"),
        }
    }
}

/// Generates one sitemap end to end: validate, page through the index, write the file.
///
/// Collaborators are injected so the job can run against fakes. Running the same request twice
/// against an unchanged index produces the same file.
pub struct SitemapJob<C, R> {
    client: C,
    resolver: R,
    writer: SitemapWriter,
    options: AssemblerOptions,
}

impl<C, R> SitemapJob<C, R>
where
    C: IndexQueryClient,
    R: IdentifierResolver,
{
    pub fn new(client: C, resolver: R, writer: SitemapWriter, options: AssemblerOptions) -> Self {
        Self {
            client,
            resolver,
            writer,
            options,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn writer(&self) -> &SitemapWriter {
        &self.writer
    }

    /// Runs a job straight from its queue payload.
    pub async fn run(&self, job_id: Uuid, payload: &SitemapJobPayload, cancel: &CancellationToken) -> JobOutcome {
        let request = match SitemapRequest::try_from(payload) {
            Ok(r) => r,
            Err(e) => {
                tracing::info!("[job: {}] Skipping sitemap job: {}", job_id, e);
                return JobOutcome::Skipped {
                    reason: SkipReason::Invalid(e),
                };
            }
        };
        self.run_request(job_id, &request, cancel).await
    }

    /// Runs a job for an already validated request.
    pub async fn run_request(&self, job_id: Uuid, request: &SitemapRequest, cancel: &CancellationToken) -> JobOutcome {
        let (name, filter) = (request.name(), request.filter());

        if let Err(e) = self.writer.sitemap_path(name) {
            tracing::warn!("[job: {}] Skipping sitemap '{}' (filter '{}'): {}", job_id, name, filter, e);
            return JobOutcome::Skipped {
                reason: SkipReason::InvalidName(e),
            };
        }

        tracing::debug!("[job: {}] Assembling sitemap '{}' (filter '{}')", job_id, name, filter);
        let document = match assemble(request, &self.client, &self.resolver, &self.options, cancel).await {
            Ok(d) => d,
            Err(Error::EmptyResult { .. }) => {
                tracing::info!("[job: {}] No results for sitemap '{}' (filter '{}')", job_id, name, filter);
                return JobOutcome::Skipped {
                    reason: SkipReason::EmptyResult,
                };
            }
            Err(error) => {
                tracing::error!(
                    "[job: {}] Failed to assemble sitemap '{}' (filter '{}'): {}",
                    job_id,
                    name,
                    filter,
                    error
                );
                return JobOutcome::Failed { error };
            }
        };

        let url_count = document.len();
        tracing::debug!("[job: {}] Writing {} URLs for sitemap '{}'", job_id, url_count, name);

        let writer = self.writer.clone();
        let owned_name = name.to_string();
        let written = tokio::task::spawn_blocking(move || writer.write(&owned_name, &document))
            .await
            .map_err(|e| WriteError::Io(std::io::Error::other(e)))
            .and_then(|r| r);

        match written {
            Ok(path) => {
                tracing::info!(
                    "[job: {}] Processing sitemap completed for '{}' (filter '{}'): {} URLs written to {}",
                    job_id,
                    name,
                    filter,
                    url_count,
                    path.display()
                );
                JobOutcome::Completed { path, url_count }
            }
            Err(e) => {
                tracing::error!(
                    "[job: {}] Failed to write sitemap '{}' (filter '{}'): {}",
                    job_id,
                    name,
                    filter,
                    e
                );
                JobOutcome::Failed { error: e.into() }
            }
        }
    }
}
