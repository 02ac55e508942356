//! Named sitemap targets, loaded from a JSON file at dispatch time.
//!
//! ```json
//! {
//!   "alldiscoverable": { "url": "https://example.org/search?query=" },
//!   "biology": { "url": "https://example.org/search?query=", "filter": "Biology" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::SitemapJobPayload;

#[derive(Debug, Error)]
pub enum TargetsError {
    #[error("Cannot read sitemap targets: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sitemap targets have missing or invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Sitemap targets have missing or invalid JSON: no targets defined")]
    Empty,

    #[error(
        "The 'url' field is missing or invalid for the following targets \
         (should have format 'https://DOMAIN/ENDPOINT?SEARCH_QUERY_PARAM='): '{}'",
        .0.join("', '")
    )]
    InvalidUrls(Vec<String>),
}

/// One configured sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapTarget {
    /// Public search URL the sitemap belongs to.
    #[serde(default)]
    pub url: Option<String>,
    /// Presentation set label to select. Defaults to the target's name.
    #[serde(default)]
    pub filter: Option<String>,
    /// Extra query parameters carried along with the target.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl SitemapTarget {
    /// The filter to queue for this target, falling back to its name.
    pub fn filter_for<'a>(&'a self, name: &'a str) -> &'a str {
        match self.filter.as_deref().map(str::trim) {
            Some(f) if !f.is_empty() => f,
            _ => name,
        }
    }
}

/// All configured sitemap targets, keyed (and ordered) by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SitemapTargets(BTreeMap<String, SitemapTarget>);

impl SitemapTargets {
    /// Parses targets without validating them.
    pub fn from_json(content: &str) -> Result<Self, TargetsError> {
        let targets: SitemapTargets = serde_json::from_str(content.trim())?;
        Ok(targets)
    }

    /// Reads, parses, and validates a targets file.
    pub fn load(path: &Path) -> Result<Self, TargetsError> {
        let content = std::fs::read_to_string(path)?;
        let targets = Self::from_json(&content)?;
        targets.validate()?;
        Ok(targets)
    }

    /// Checks that at least one target exists and that every non-empty `url` is an absolute web URL.
    /// Reports all offending target names at once.
    pub fn validate(&self) -> Result<(), TargetsError> {
        if self.0.is_empty() {
            return Err(TargetsError::Empty);
        }

        let bad_urls: Vec<String> = self
            .0
            .iter()
            .filter(|(_, target)| match target.url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => !is_valid_target_url(url),
                _ => false,
            })
            .map(|(name, _)| name.clone())
            .collect();

        if bad_urls.is_empty() {
            Ok(())
        } else {
            Err(TargetsError::InvalidUrls(bad_urls))
        }
    }

    pub fn get(&self, name: &str) -> Option<&SitemapTarget> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SitemapTarget)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One queue payload per target, in name order.
    pub fn payloads(&self) -> Vec<SitemapJobPayload> {
        self.0
            .iter()
            .map(|(name, target)| SitemapJobPayload::new(name.as_str(), target.filter_for(name)))
            .collect()
    }
}

impl FromIterator<(String, SitemapTarget)> for SitemapTargets {
    fn from_iter<I: IntoIterator<Item = (String, SitemapTarget)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn is_valid_target_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
