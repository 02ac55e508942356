//! The search index as seen by the sitemap pipeline.

use async_trait::async_trait;
use data_model_smap::{FilterSpec, ResultPage};

use crate::errors::ClientError;

/// Unique record identifier; results are sorted on it so paging is stable.
pub const ID_FIELD: &str = "id";
/// Multi-valued repository path of the record's collection.
pub const COLLECTION_FIELD: &str = "collection";
/// Boolean flag marking records that may appear publicly.
pub const DISCOVERABLE_FIELD: &str = "is_discoverable";
/// Presentation set label matched by a sitemap's filter.
pub const LABEL_FIELD: &str = "presentation_set_label";

/// One page request against the index.
///
/// Results are sorted ascending on `sort_field`, restricted to `fields`, and retrieved raw:
/// no relevance ranking or query-time text processing is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub filter: FilterSpec,
    /// Offset of the first record in the page.
    pub start: u64,
    /// Maximum number of records in the page.
    pub rows: u64,
    pub sort_field: String,
    pub fields: Vec<String>,
}

impl IndexQuery {
    /// The query a sitemap job issues for records `[start, start + rows)`.
    pub fn page(filter: &FilterSpec, start: u64, rows: u64) -> Self {
        Self {
            filter: filter.clone(),
            start,
            rows,
            sort_field: ID_FIELD.to_string(),
            fields: vec![ID_FIELD.to_string(), COLLECTION_FIELD.to_string()],
        }
    }

    /// Exclusive end of the requested range.
    pub fn end(&self) -> u64 {
        self.start + self.rows
    }
}

/// Interface to a search index that can serve filtered, sorted pages of records.
#[async_trait]
pub trait IndexQueryClient: Send + Sync {
    async fn query(&self, query: &IndexQuery) -> Result<ResultPage, ClientError>;
}
