use std::path::PathBuf;
use std::time::Duration;

use crate::assembler::{AssemblerOptions, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_RESOLVE_CONCURRENCY};

pub const DEFAULT_PUBLIC_DIR: &str = "./public";
pub const DEFAULT_TARGETS_FILE: &str = "./sitemap_targets.json";
pub const DEFAULT_HTTP_TIMEOUT_S: u64 = 30;

/// Everything a sitemap job needs to reach its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapConfig {
    /// Base URL of the Solr core, e.g. `http://localhost:8983/solr/fcrepo`.
    pub solr_url: String,
    /// Base URL of the identifier token lookup service.
    pub resolver_url: String,
    /// Directory sitemaps are written to.
    pub public_dir: PathBuf,
    /// JSON file with the named sitemap targets.
    pub targets_file: PathBuf,
    /// Upper bound for every index query and token lookup.
    pub http_timeout: Duration,
    pub assembler: AssemblerOptions,
}

impl SitemapConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &'static str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let solr_url = value("SOLR_URL").ok_or(ConfigError::Missing("SOLR_URL"))?;
        let resolver_url = value("RESOLVER_URL").ok_or(ConfigError::Missing("RESOLVER_URL"))?;
        let public_dir = PathBuf::from(value("SITEMAP_PUBLIC_DIR").unwrap_or_else(|| DEFAULT_PUBLIC_DIR.to_string()));
        let targets_file =
            PathBuf::from(value("SITEMAP_TARGETS_FILE").unwrap_or_else(|| DEFAULT_TARGETS_FILE.to_string()));

        let http_timeout = Duration::from_secs(positive("HTTP_TIMEOUT_S", value("HTTP_TIMEOUT_S"), DEFAULT_HTTP_TIMEOUT_S)?);
        let assembler = AssemblerOptions {
            page_size: positive("SITEMAP_PAGE_SIZE", value("SITEMAP_PAGE_SIZE"), DEFAULT_PAGE_SIZE)?,
            max_pages: positive("SITEMAP_MAX_PAGES", value("SITEMAP_MAX_PAGES"), DEFAULT_MAX_PAGES)?,
            resolve_concurrency: positive(
                "SITEMAP_RESOLVE_CONCURRENCY",
                value("SITEMAP_RESOLVE_CONCURRENCY"),
                DEFAULT_RESOLVE_CONCURRENCY,
            )?,
        };

        Ok(Self {
            solr_url,
            resolver_url,
            public_dir,
            targets_file,
            http_timeout,
            assembler,
        })
    }
}

/// Same as [`SitemapConfig::from_env`] but panics on error.
pub fn get_config() -> SitemapConfig {
    match SitemapConfig::from_env() {
        Ok(config) => config,
        Err(e) => panic!("Invalid sitemap configuration: {}", e),
    }
}

/// Parses an optional variable as a positive number, falling back to `default` when unset.
pub fn positive<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value {
        None => Ok(default),
        Some(v) => match v.parse::<T>() {
            Ok(n) if n > T::default() => Ok(n),
            _ => Err(ConfigError::Invalid { name, value: v }),
        },
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "{} must be set in .env file or present as an env var", name),
            Self::Invalid { name, value } => write!(f, "{} must be a valid positive number, got '{}'", name, value),
        }
    }
}
