//! # Solr sitemap generation
//!
//! Builds flat-file sitemaps (one URL path per line) by paging through a Solr index,
//! resolving each record's public token, and atomically replacing `<public>/<name>.txt`.
//!
//! ```no_run
//! use core_smap::{AssemblerOptions, HttpIdentifierResolver, SitemapJob, SitemapWriter, SolrClient};
//! use data_model_smap::SitemapJobPayload;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let timeout = Duration::from_secs(30);
//! let job = SitemapJob::new(
//!     SolrClient::new("http://localhost:8983/solr/fcrepo", timeout)?,
//!     HttpIdentifierResolver::new("http://localhost:8080/hash", timeout)?,
//!     SitemapWriter::new("./public"),
//!     AssemblerOptions::default(),
//! );
//! let outcome = job
//!     .run(uuid::Uuid::new_v4(), &SitemapJobPayload::new("biology", "biology"), &CancellationToken::new())
//!     .await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod common;
pub mod config;
pub mod errors;
pub mod index;
pub mod job;
pub mod resolver;
pub mod solr;
pub mod url_builder;
pub mod writer;

// Make the fakes available for tests in this crate and dependent crates
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use assembler::{AssemblerOptions, assemble};
pub use common::logging::{setup_logging, setup_test_logging};
pub use config::{ConfigError, SitemapConfig, get_config};
pub use errors::{ClientError, Error, Result};
pub use index::{IndexQuery, IndexQueryClient};
pub use job::{JobOutcome, SitemapJob, SkipReason};
pub use resolver::{HttpIdentifierResolver, IdentifierResolver};
pub use solr::SolrClient;
pub use url_builder::{build_sitemap_url, collection_prefix, strip_document_prefix};
pub use writer::{SitemapWriter, WriteError};

/// The production job: Solr for records, HTTP lookups for tokens.
pub type LiveSitemapJob = SitemapJob<SolrClient, HttpIdentifierResolver>;

/// Builds the production job from configuration.
pub fn live_job(config: &SitemapConfig) -> std::result::Result<LiveSitemapJob, ClientError> {
    Ok(SitemapJob::new(
        SolrClient::new(&config.solr_url, config.http_timeout)?,
        HttpIdentifierResolver::new(&config.resolver_url, config.http_timeout)?,
        SitemapWriter::new(&config.public_dir),
        config.assembler,
    ))
}
