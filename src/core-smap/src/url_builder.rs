//! Turns an index record into its sitemap URL.

use data_model_smap::SitemapUrl;

use crate::resolver::IdentifierResolver;

/// Prefix used for every collection that is not a domain-code (`dc`) collection.
pub const DEFAULT_COLLECTION_PREFIX: &str = "pcdm";

const DOCUMENT_ID_PREFIX: &str = "solr_document/";
const REST_SEGMENT: &str = "/rest/";
const DOMAIN_CODE: &str = "dc";

/// Removes the index's `solr_document/` prefix from a record id.
pub fn strip_document_prefix(id: &str) -> String {
    id.replace(DOCUMENT_ID_PREFIX, "")
}

/// Derives the `relpath` disambiguation tag for a record's collection.
///
/// Paths whose REST suffix starts with `dc/` map to the last `/rest/`-delimited segment with
/// every `//` turned into `::`. Anything else, including empty or malformed paths, is `pcdm`.
pub fn collection_prefix(collection_path: &str) -> String {
    let Some((_, after_rest)) = collection_path.split_once(REST_SEGMENT) else {
        return DEFAULT_COLLECTION_PREFIX.to_string();
    };
    if after_rest.is_empty() || after_rest.split('/').next() != Some(DOMAIN_CODE) {
        return DEFAULT_COLLECTION_PREFIX.to_string();
    }

    collection_path
        .rsplit(REST_SEGMENT)
        .next()
        .map(|last| last.replace("//", "::"))
        .unwrap_or_else(|| DEFAULT_COLLECTION_PREFIX.to_string())
}

/// Builds the sitemap URL for a record, or `None` when its id has no public token.
pub async fn build_sitemap_url<R>(id: &str, collection_path: &str, resolver: &R) -> Option<SitemapUrl>
where
    R: IdentifierResolver + ?Sized,
{
    let id = strip_document_prefix(id);
    let prefix = collection_prefix(collection_path);
    let token = resolver.resolve(&id).await?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(SitemapUrl::new(token, &prefix))
}
