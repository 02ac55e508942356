pub mod models;
pub mod targets;

pub use models::{
    ALL_DISCOVERABLE, FilterSpec, IndexRecord, ResultPage, SitemapDocument, SitemapJobPayload, SitemapRequest,
    SitemapUrl, ValidationError,
};
pub use targets::{SitemapTarget, SitemapTargets, TargetsError};
