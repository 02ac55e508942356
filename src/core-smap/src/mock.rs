//! In-memory index and resolver for testing
//!
//! These implement [`IndexQueryClient`] and [`IdentifierResolver`] without any network access,
//! and record the calls they receive so tests can assert on paging and filtering.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use data_model_smap::{IndexRecord, ResultPage};

use crate::errors::ClientError;
use crate::index::{IndexQuery, IndexQueryClient};
use crate::resolver::IdentifierResolver;

/// Mock search index serving a fixed, already-sorted list of records.
pub struct MockIndex {
    records: Vec<IndexRecord>,
    /// Reported total; defaults to the number of records.
    total_count: Option<u64>,
    /// Fail every query from this (zero-based) call onwards.
    fail_from_call: Option<usize>,
    queries: Mutex<Vec<IndexQuery>>,
}

impl MockIndex {
    pub fn new(records: Vec<IndexRecord>) -> Self {
        Self {
            records,
            total_count: None,
            fail_from_call: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// An index with no matching records.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// An index whose every query fails.
    pub fn with_failure() -> Self {
        Self::empty().failing_from(0)
    }

    /// Report `total_count` regardless of how many records are actually served.
    pub fn reporting_total(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    /// Fail the `call`-th query (zero-based) and every one after it.
    pub fn failing_from(mut self, call: usize) -> Self {
        self.fail_from_call = Some(call);
        self
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> Vec<IndexQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// Number of queries received so far.
    pub fn page_count(&self) -> usize {
        self.queries().len()
    }
}

#[async_trait]
impl IndexQueryClient for MockIndex {
    async fn query(&self, query: &IndexQuery) -> Result<ResultPage, ClientError> {
        let call = {
            let mut queries = self.queries.lock().map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
            queries.push(query.clone());
            queries.len() - 1
        };

        if self.fail_from_call.is_some_and(|from| call >= from) {
            return Err(ClientError::Status {
                status: 503,
                body: "Mock index configured to fail".to_string(),
            });
        }

        let len = self.records.len();
        let start = usize::try_from(query.start).unwrap_or(usize::MAX).min(len);
        let end = usize::try_from(query.end()).unwrap_or(usize::MAX).min(len);

        Ok(ResultPage {
            records: self.records[start..end].to_vec(),
            total_count: self.total_count.unwrap_or(len as u64),
        })
    }
}

/// Mock identifier resolver.
///
/// By default every id resolves to `h-<id>`; specific ids can be made to miss,
/// or an explicit token table can be used instead.
pub struct MockResolver {
    tokens: Option<HashMap<String, String>>,
    misses: HashSet<String>,
    calls: AtomicUsize,
}

impl MockResolver {
    /// Resolve every id to `h-<id>`.
    pub fn new() -> Self {
        Self {
            tokens: None,
            misses: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Resolve only the listed ids, to the listed tokens.
    pub fn with_tokens(tokens: Vec<(&str, &str)>) -> Self {
        Self {
            tokens: Some(tokens.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
            ..Self::new()
        }
    }

    /// Resolve every id to `h-<id>` except the listed ones.
    pub fn with_misses(misses: Vec<&str>) -> Self {
        Self {
            misses: misses.into_iter().map(str::to_string).collect(),
            ..Self::new()
        }
    }

    /// Number of lookups performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentifierResolver for MockResolver {
    async fn resolve(&self, id: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.misses.contains(id) {
            return None;
        }
        match &self.tokens {
            Some(tokens) => tokens.get(id).cloned(),
            None => Some(format!("h-{}", id)),
        }
    }
}

//
// Test Fixtures
//

/// `count` records with ids `solr_document/rec-00000`, `solr_document/rec-00001`, ...
/// Even records live in a `dc` collection, odd ones in a `pcdm` collection.
pub fn sample_records(count: usize) -> Vec<IndexRecord> {
    (0..count)
        .map(|i| {
            let collection = if i % 2 == 0 {
                "http://fcrepo:8080/fcrepo/rest/dc//2016//1"
            } else {
                "http://fcrepo:8080/fcrepo/rest/pcdm/c7/4f/12"
            };
            IndexRecord::new(format!("solr_document/{}", sample_id(i)), collection)
        })
        .collect()
}

/// The bare id (no `solr_document/` prefix) of the `i`-th sample record.
pub fn sample_id(i: usize) -> String {
    format!("rec-{:05}", i)
}

/// The sitemap line the `i`-th sample record produces under [`MockResolver::new`].
pub fn sample_url(i: usize) -> String {
    let prefix = if i % 2 == 0 { "dc::2016::1" } else { "pcdm" };
    format!("/result/id/h-{}?relpath={}", sample_id(i), prefix)
}

#[cfg(test)]
mod tests {
    use data_model_smap::FilterSpec;

    use super::*;

    #[tokio::test]
    async fn test_mock_index_pages() {
        let index = MockIndex::new(sample_records(7));
        let filter = FilterSpec::all_discoverable();

        let first = index.query(&IndexQuery::page(&filter, 0, 5)).await.unwrap();
        assert_eq!(first.records.len(), 5);
        assert_eq!(first.total_count, 7);

        let second = index.query(&IndexQuery::page(&filter, 5, 5)).await.unwrap();
        assert_eq!(second.records.len(), 2);

        let past_end = index.query(&IndexQuery::page(&filter, 10, 5)).await.unwrap();
        assert!(past_end.is_empty());
        assert_eq!(index.page_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_index_failure() {
        let index = MockIndex::new(sample_records(3)).failing_from(1);
        let filter = FilterSpec::all_discoverable();
        assert!(index.query(&IndexQuery::page(&filter, 0, 1)).await.is_ok());
        assert!(index.query(&IndexQuery::page(&filter, 1, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_resolver() {
        let resolver = MockResolver::with_misses(vec!["b"]);
        assert_eq!(resolver.resolve("a").await.as_deref(), Some("h-a"));
        assert_eq!(resolver.resolve("b").await, None);
        assert_eq!(resolver.calls(), 2);
    }

    #[test]
    fn test_sample_fixtures_agree() {
        let records = sample_records(2);
        assert_eq!(records[0].id, "solr_document/rec-00000");
        assert_eq!(sample_url(0), "/result/id/h-rec-00000?relpath=dc::2016::1");
        assert_eq!(sample_url(1), "/result/id/h-rec-00001?relpath=pcdm");
    }
}
