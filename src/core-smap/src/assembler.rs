//! Pages through the index and collects sitemap URLs.

use data_model_smap::{SitemapDocument, SitemapRequest, SitemapUrl};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, Result};
use crate::index::{IndexQuery, IndexQueryClient};
use crate::resolver::IdentifierResolver;
use crate::url_builder::build_sitemap_url;

/// Records requested per index query.
pub const DEFAULT_PAGE_SIZE: u64 = 500;
/// Upper bound on pages per sitemap (1,000,000 records at the default page size).
pub const DEFAULT_MAX_PAGES: usize = 2000;
/// Token lookups in flight at once while processing a page.
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;

/// Tuning for [`assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    pub page_size: u64,
    pub max_pages: usize,
    pub resolve_concurrency: usize,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        }
    }
}

/// Collects the sitemap for `request`, one page at a time.
///
/// Pages are fetched sequentially and URLs keep the index's order. Paging stops once the offset
/// passes the total the index reported on the latest page, or when a page comes back empty.
///
/// # Errors
///
/// - [`Error::EmptyResult`] if nothing matched, or no record produced a URL. Nothing should be written.
/// - [`Error::IndexUnavailable`] if any page query fails.
/// - [`Error::PageLimitExceeded`] if `max_pages` pages were fetched without covering the reported total.
/// - [`Error::Cancelled`] if `cancel` fires; it is checked before and during every page query.
pub async fn assemble<C, R>(
    request: &SitemapRequest,
    client: &C,
    resolver: &R,
    options: &AssemblerOptions,
    cancel: &CancellationToken,
) -> Result<SitemapDocument>
where
    C: IndexQueryClient + ?Sized,
    R: IdentifierResolver + ?Sized,
{
    let filter = request.filter_spec();
    let page_size = options.page_size.max(1);
    let concurrency = options.resolve_concurrency.max(1);

    let mut document = SitemapDocument::new();
    let mut start: u64 = 0;
    let mut total_count: u64 = 0;
    let mut pages: usize = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if pages >= options.max_pages {
            tracing::warn!(
                "[sitemap: {}] Reached the limit of {} pages at offset {} (index reports {} results), aborting",
                request.name(),
                options.max_pages,
                start,
                total_count
            );
            return Err(Error::PageLimitExceeded { pages, total_count });
        }

        let query = IndexQuery::page(&filter, start, page_size);
        tracing::debug!(
            "[sitemap: {}] Querying records {}..{} (index reports {} results)",
            request.name(),
            query.start,
            query.end(),
            total_count
        );

        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            page = client.query(&query) => page?,
        };
        pages += 1;
        total_count = page.total_count;

        if page.is_empty() {
            if document.is_empty() {
                tracing::info!("[sitemap: {}] No results for {}", request.name(), request.filter());
                return Err(empty_result(request));
            }
            tracing::debug!(
                "[sitemap: {}] Empty page at offset {}, keeping {} URLs",
                request.name(),
                start,
                document.len()
            );
            break;
        }

        let before = document.len();
        // Futures are built eagerly (they stay lazy until polled) so the stream
        // carries no higher-ranked closures, which keeps it `Send` for `tokio::spawn`.
        let lookups: Vec<_> = page
            .records
            .iter()
            .filter(|r| !r.id.is_empty())
            .map(|record| build_sitemap_url(&record.id, &record.collection_path, resolver))
            .collect();
        let urls: Vec<Option<SitemapUrl>> = stream::iter(lookups)
            .buffered(concurrency)
            .collect()
            .await;
        for url in urls.into_iter().flatten() {
            document.push(url);
        }

        let added = document.len() - before;
        if added < page.records.len() {
            tracing::debug!(
                "[sitemap: {}] Skipped {} of {} records without a token",
                request.name(),
                page.records.len() - added,
                page.records.len()
            );
        }

        start += page_size;
        if start >= total_count {
            break;
        }
    }

    if document.is_empty() {
        tracing::info!(
            "[sitemap: {}] No resolvable records for {}",
            request.name(),
            request.filter()
        );
        return Err(empty_result(request));
    }

    Ok(document)
}

fn empty_result(request: &SitemapRequest) -> Error {
    Error::EmptyResult {
        filter: request.filter().to_string(),
    }
}
