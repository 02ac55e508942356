//! Solr implementation of [`IndexQueryClient`] over the `/select` handler.

use std::time::Duration;

use async_trait::async_trait;
use data_model_smap::{FilterSpec, IndexRecord, ResultPage};
use serde::Deserialize;
use url::Url;

use crate::errors::ClientError;
use crate::index::{DISCOVERABLE_FIELD, IndexQuery, IndexQueryClient, LABEL_FIELD};

/// Queries a single Solr core, e.g. `http://localhost:8983/solr/fcrepo`.
#[derive(Debug, Clone)]
pub struct SolrClient {
    http: reqwest::Client,
    select_url: Url,
}

impl SolrClient {
    /// Builds a client whose requests are bounded by `timeout`.
    pub fn new(core_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, core_url)
    }

    pub fn with_client(http: reqwest::Client, core_url: &str) -> Result<Self, ClientError> {
        let mut core = Url::parse(core_url)?;
        if !core.path().ends_with('/') {
            let path = format!("{}/", core.path());
            core.set_path(&path);
        }
        let select_url = core.join("select")?;
        Ok(Self { http, select_url })
    }

    /// The full `/select` URL for a page query.
    pub fn request_url(&self, query: &IndexQuery) -> Url {
        let mut url = self.select_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", "*:*");
            for fq in filter_queries(&query.filter) {
                pairs.append_pair("fq", &fq);
            }
            pairs
                .append_pair("start", &query.start.to_string())
                .append_pair("rows", &query.rows.to_string())
                .append_pair("sort", &format!("{} asc", query.sort_field))
                .append_pair("fl", &query.fields.join(","))
                .append_pair("wt", "json");
        }
        url
    }
}

#[async_trait]
impl IndexQueryClient for SolrClient {
    async fn query(&self, query: &IndexQuery) -> Result<ResultPage, ClientError> {
        let url = self.request_url(query);
        tracing::trace!("Solr request: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_select_response(&body)
    }
}

/// Filter queries for a [`FilterSpec`]: the discoverability flag, plus the label when present.
fn filter_queries(filter: &FilterSpec) -> Vec<String> {
    let mut fqs = vec![format!("{}:{}", DISCOVERABLE_FIELD, filter.discoverable)];
    if let Some(label) = &filter.label {
        fqs.push(format!("{}:\"{}\"", LABEL_FIELD, escape_phrase(label)));
    }
    fqs
}

fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SolrDoc>,
}

#[derive(Debug, Deserialize)]
struct SolrDoc {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    collection: Option<FieldValue>,
}

/// Solr returns multi-valued fields as arrays and single-valued ones as scalars.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    fn first(self) -> Option<String> {
        match self {
            FieldValue::One(v) => Some(v),
            FieldValue::Many(vs) => vs.into_iter().next(),
        }
    }
}

fn parse_select_response(body: &str) -> Result<ResultPage, ClientError> {
    let parsed: SelectResponse =
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

    let records = parsed
        .response
        .docs
        .into_iter()
        .map(|doc| IndexRecord {
            id: doc.id.unwrap_or_default(),
            collection_path: doc.collection.and_then(FieldValue::first).unwrap_or_default(),
        })
        .collect();

    Ok(ResultPage {
        records,
        total_count: parsed.response.num_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SolrClient {
        SolrClient::with_client(reqwest::Client::new(), "http://localhost:8983/solr/fcrepo").unwrap()
    }

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn test_request_url_with_label() {
        let query = IndexQuery::page(&FilterSpec::with_label("biology"), 500, 500);
        let url = client().request_url(&query);

        assert_eq!(url.path(), "/solr/fcrepo/select");
        let pairs = pairs(&url);
        let fqs: Vec<&str> = pairs.iter().filter(|(k, _)| k == "fq").map(|(_, v)| v.as_str()).collect();
        assert_eq!(fqs, vec!["is_discoverable:true", "presentation_set_label:\"biology\""]);
        assert!(pairs.contains(&("start".to_string(), "500".to_string())));
        assert!(pairs.contains(&("rows".to_string(), "500".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "id asc".to_string())));
        assert!(pairs.contains(&("fl".to_string(), "id,collection".to_string())));
    }

    #[test]
    fn test_request_url_all_discoverable_has_no_label() {
        let query = IndexQuery::page(&FilterSpec::all_discoverable(), 0, 500);
        let url = client().request_url(&query);
        let fqs: Vec<String> = pairs(&url)
            .into_iter()
            .filter(|(k, _)| k == "fq")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(fqs, vec!["is_discoverable:true"]);
    }

    #[test]
    fn test_core_url_with_trailing_slash() {
        let client = SolrClient::with_client(reqwest::Client::new(), "http://localhost:8983/solr/fcrepo/").unwrap();
        let url = client.request_url(&IndexQuery::page(&FilterSpec::all_discoverable(), 0, 1));
        assert_eq!(url.path(), "/solr/fcrepo/select");
    }

    #[test]
    fn test_label_is_escaped() {
        let fqs = filter_queries(&FilterSpec::with_label(r#"Say "hi" \o/"#));
        assert_eq!(fqs[1], r#"presentation_set_label:"Say \"hi\" \\o/""#);
    }

    #[test]
    fn test_parse_select_response() {
        let body = r#"{
            "responseHeader": {"status": 0},
            "response": {
                "numFound": 1200,
                "start": 0,
                "docs": [
                    {"id": "solr_document/abc", "collection": ["http://fcrepo/rest/dc/2016/1", "other"]},
                    {"id": "solr_document/def", "collection": "http://fcrepo/rest/pcdm/xyz"},
                    {"id": "solr_document/ghi"}
                ]
            }
        }"#;

        let page = parse_select_response(body).unwrap();
        assert_eq!(page.total_count, 1200);
        assert_eq!(
            page.records,
            vec![
                IndexRecord::new("solr_document/abc", "http://fcrepo/rest/dc/2016/1"),
                IndexRecord::new("solr_document/def", "http://fcrepo/rest/pcdm/xyz"),
                IndexRecord::new("solr_document/ghi", ""),
            ]
        );
    }

    #[test]
    fn test_parse_malformed_response() {
        let result = parse_select_response(r#"{"error": {"msg": "undefined field"}}"#);
        assert!(matches!(result, Err(ClientError::MalformedResponse(_))));
    }
}
