use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filter (or sitemap name) that selects every discoverable record instead of one presentation set.
pub const ALL_DISCOVERABLE: &str = "alldiscoverable";

/// Line terminator between URLs in a written sitemap.
pub const LINE_SEPARATOR: &str = "\n";

/// A sitemap job exactly as it was placed on the queue.
/// Both fields are optional here: validation happens when it becomes a [`SitemapRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapJobPayload {
    /// Output name of the sitemap file (without the `.txt` extension).
    #[serde(default)]
    pub sitemap: Option<String>,
    /// Presentation set label to select, or [`ALL_DISCOVERABLE`].
    #[serde(default)]
    pub filter: Option<String>,
}

impl SitemapJobPayload {
    pub fn new(sitemap: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            sitemap: Some(sitemap.into()),
            filter: Some(filter.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required queue field was absent or blank.
    #[error("sitemap and filter fields are required ('{0}' is missing or empty)")]
    MissingField(&'static str),
}

/// A validated request to generate one sitemap.
/// Both fields are trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapRequest {
    name: String,
    filter: String,
}

impl SitemapRequest {
    pub fn new(name: &str, filter: &str) -> Result<Self, ValidationError> {
        let name = required("sitemap", Some(name))?;
        let filter = required("filter", Some(filter))?;
        Ok(Self { name, filter })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// True when neither the name nor the filter narrows the selection to a single presentation set.
    pub fn is_all_discoverable(&self) -> bool {
        self.name == ALL_DISCOVERABLE || self.filter == ALL_DISCOVERABLE
    }

    /// The index-side selection for this request.
    pub fn filter_spec(&self) -> FilterSpec {
        if self.is_all_discoverable() {
            FilterSpec::all_discoverable()
        } else {
            FilterSpec::with_label(&self.filter)
        }
    }
}

impl TryFrom<&SitemapJobPayload> for SitemapRequest {
    type Error = ValidationError;

    fn try_from(payload: &SitemapJobPayload) -> Result<Self, Self::Error> {
        let name = required("sitemap", payload.sitemap.as_deref())?;
        let filter = required("filter", payload.filter.as_deref())?;
        Ok(Self { name, filter })
    }
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Conditions applied to every index query of a sitemap job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Required value of the discoverability flag.
    pub discoverable: bool,
    /// Required presentation set label. `None` disables the label condition entirely.
    pub label: Option<String>,
}

impl FilterSpec {
    pub fn all_discoverable() -> Self {
        Self {
            discoverable: true,
            label: None,
        }
    }

    pub fn with_label(label: &str) -> Self {
        Self {
            discoverable: true,
            label: Some(label.to_string()),
        }
    }
}

/// One document returned by the search index, limited to the fields a sitemap needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    /// Repository path of the record's collection, e.g. `http://host/rest/dc/2016/1`.
    pub collection_path: String,
}

impl IndexRecord {
    pub fn new(id: impl Into<String>, collection_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection_path: collection_path.into(),
        }
    }
}

/// A single page of index results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub records: Vec<IndexRecord>,
    /// The index's current estimate of how many records match the query overall.
    pub total_count: u64,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A single sitemap line: `/result/id/<token>?relpath=<prefix>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SitemapUrl(String);

impl SitemapUrl {
    pub fn new(token: &str, collection_prefix: &str) -> Self {
        Self(format!("/result/id/{}?relpath={}", token, collection_prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SitemapUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered list of sitemap URLs, in the order the index returned their records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    urls: Vec<SitemapUrl>,
}

impl SitemapDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: SitemapUrl) {
        self.urls.push(url);
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[SitemapUrl] {
        &self.urls
    }

    /// File content: one URL per line, no trailing separator.
    pub fn render(&self) -> String {
        self.urls
            .iter()
            .map(SitemapUrl::as_str)
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }
}

impl FromIterator<SitemapUrl> for SitemapDocument {
    fn from_iter<I: IntoIterator<Item = SitemapUrl>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}
