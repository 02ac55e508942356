//! Lookup of the short, public token that stands in for a record id in sitemap URLs.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::errors::ClientError;

/// Maps a record id to its public token.
///
/// Resolution is per-record and never fatal: any failure is reported as `None`
/// and the record is left out of the sitemap.
#[async_trait]
pub trait IdentifierResolver: Send + Sync {
    async fn resolve(&self, id: &str) -> Option<String>;
}

/// Resolves tokens with `GET <base>/<id>`; the trimmed response body is the token.
#[derive(Debug, Clone)]
pub struct HttpIdentifierResolver {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpIdentifierResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::UrlParseError(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { http, base_url })
    }

    /// The lookup URL for `id`, with the id percent-encoded as a single path segment.
    pub fn lookup_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    async fn lookup(&self, id: &str) -> Result<Option<String>, ClientError> {
        let response = self.http.get(self.lookup_url(id)).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let token = body.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }
}

#[async_trait]
impl IdentifierResolver for HttpIdentifierResolver {
    async fn resolve(&self, id: &str) -> Option<String> {
        match self.lookup(id).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to resolve token for '{}': {}", id, e);
                None
            }
        }
    }
}
