//! OpenAlex pipeline configuration

use std::path::PathBuf;
use std::time::Duration;

use alexharvest_core::{HttpConfig, RetryPolicy};

use crate::transform::WorkPolicy;

/// Public OpenAlex REST API
pub const OPENALEX_API_URL: &str = "https://api.openalex.org";

/// Author Discovery settings
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// `filter` expression for `/authors`
    pub filter: String,
    pub per_page: u32,
    /// Pause between consecutive list pages
    pub page_pause: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            filter: "affiliations.institution.country_code:SA|AE|QA".to_string(),
            per_page: 100,
            page_pause: Duration::from_secs(1),
        }
    }
}

/// Author Enrichment settings
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Worker pool size; kept small to stay under upstream limits
    pub workers: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { workers: 5 }
    }
}

/// Work Collection settings
#[derive(Debug, Clone)]
pub struct WorksConfig {
    pub per_page: u32,
    /// Work types joined into the `type:` filter (empty = no type filter)
    pub types: Vec<String>,
    /// Flush buffered records every N successfully fetched pages
    pub checkpoint_interval: u64,
    /// Requests-per-second ceiling for the reactive limiter
    pub max_requests_per_second: f64,
    pub retry: RetryPolicy,
    pub policy: WorkPolicy,
    /// Only crawl the first N authors (trial runs)
    pub max_authors: Option<usize>,
}

impl Default for WorksConfig {
    fn default() -> Self {
        Self {
            per_page: 200,
            types: ["article", "preprint", "book-chapter", "book", "paratext"]
                .into_iter()
                .map(String::from)
                .collect(),
            checkpoint_interval: 100,
            max_requests_per_second: 10.0,
            retry: RetryPolicy::default(),
            policy: WorkPolicy::default(),
            max_authors: None,
        }
    }
}

/// Output file locations
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub authors_basic: PathBuf,
    pub authors_detailed: PathBuf,
    pub works: PathBuf,
}

impl OutputPaths {
    /// Default file names under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            authors_basic: dir.join("authors_basic.csv"),
            authors_detailed: dir.join("authors_detailed.csv"),
            works: dir.join("works_detailed.jsonl"),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

/// Runtime configuration for all three pipelines
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL without trailing slash
    pub api_url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    pub http: HttpConfig,
    pub discovery: DiscoveryConfig,
    pub enrichment: EnrichmentConfig,
    pub works: WorksConfig,
    pub output: OutputPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: OPENALEX_API_URL.to_string(),
            api_key: None,
            http: HttpConfig::default(),
            discovery: DiscoveryConfig::default(),
            enrichment: EnrichmentConfig::default(),
            works: WorksConfig::default(),
            output: OutputPaths::default(),
        }
    }
}

impl Config {
    fn base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// `/authors` list endpoint
    pub fn authors_url(&self) -> String {
        format!("{}/authors", self.base())
    }

    /// `/authors/{id}` detail endpoint
    pub fn author_detail_url(&self, author_id: &str) -> String {
        format!("{}/authors/{}", self.base(), short_id(author_id))
    }

    /// Works query for one author, with the filter embedded in the URL.
    ///
    /// This exact string is recorded as `source_link` on every work it yields.
    pub fn works_query_url(&self, author_id: &str) -> String {
        let mut filter = format!("author.id:{}", short_id(author_id));
        if !self.works.types.is_empty() {
            filter.push_str(",type:");
            filter.push_str(&self.works.types.join("|"));
        }
        format!("{}/works?filter={filter}", self.base())
    }
}

/// Extract short ID from full OpenAlex URL (e.g., "https://openalex.org/A123" -> "A123")
pub fn short_id(id: &str) -> &str {
    id.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(id)
}
