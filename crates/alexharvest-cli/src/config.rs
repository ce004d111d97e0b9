//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use alexharvest_core::{HttpConfig, RetryPolicy};
use alexharvest_openalex::config::{
    DiscoveryConfig, EnrichmentConfig, OutputPaths, WorksConfig, OPENALEX_API_URL,
};
use alexharvest_openalex::WorkPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable read when no API key is configured
pub const API_KEY_ENV: &str = "OPENALEX_API_KEY";

/// File configuration for alexharvest
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub discovery: DiscoverySection,
    pub enrichment: EnrichmentSection,
    pub works: WorksSection,
    pub output: OutputSection,
    pub http: HttpSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: OPENALEX_API_URL.to_string(),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub filter: String,
    pub per_page: u32,
    /// Seconds to pause between pages
    pub page_pause: f64,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        let d = DiscoveryConfig::default();
        Self {
            filter: d.filter,
            per_page: d.per_page,
            page_pause: d.page_pause.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnrichmentSection {
    pub workers: usize,
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            workers: EnrichmentConfig::default().workers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorksSection {
    pub per_page: u32,
    pub types: Vec<String>,
    pub checkpoint_interval: u64,
    pub max_requests_per_second: f64,
    pub max_attempts: u32,
    pub max_full_authorships: usize,
    pub min_publication_year: i32,
    pub max_authors: Option<usize>,
}

impl Default for WorksSection {
    fn default() -> Self {
        let w = WorksConfig::default();
        Self {
            per_page: w.per_page,
            types: w.types,
            checkpoint_interval: w.checkpoint_interval,
            max_requests_per_second: w.max_requests_per_second,
            max_attempts: w.retry.max_attempts,
            max_full_authorships: w.policy.max_full_authorships,
            min_publication_year: w.policy.min_publication_year,
            max_authors: w.max_authors,
        }
    }
}

/// Output locations; individual files default to names inside `dir`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub authors_basic: Option<PathBuf>,
    pub authors_detailed: Option<PathBuf>,
    pub works: Option<PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            authors_basic: None,
            authors_detailed: None,
            works: None,
        }
    }
}

impl OutputSection {
    pub fn paths(&self) -> OutputPaths {
        let defaults = OutputPaths::in_dir(&self.dir);
        OutputPaths {
            authors_basic: self.authors_basic.clone().unwrap_or(defaults.authors_basic),
            authors_detailed: self
                .authors_detailed
                .clone()
                .unwrap_or(defaults.authors_detailed),
            works: self.works.clone().unwrap_or(defaults.works),
        }
    }
}

/// HTTP client settings, in seconds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub connect_timeout: u64,
    pub request_timeout: u64,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpSection {
    fn default() -> Self {
        let h = HttpConfig::default();
        Self {
            connect_timeout: h.connect_timeout.as_secs(),
            request_timeout: h.request_timeout.as_secs(),
            pool_max_idle_per_host: h.pool_max_idle_per_host,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)).filter(|s| !s.is_empty()))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./alexharvest.toml (current directory)
    /// 2. ~/.config/alexharvest/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("alexharvest.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "alexharvest") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Runtime configuration for the pipelines
    pub fn to_runtime(&self) -> Result<alexharvest_openalex::Config> {
        anyhow::ensure!(
            self.discovery.page_pause.is_finite() && self.discovery.page_pause >= 0.0,
            "discovery.page_pause must be a non-negative number of seconds"
        );
        anyhow::ensure!(self.enrichment.workers > 0, "enrichment.workers must be at least 1");
        anyhow::ensure!(self.works.max_attempts > 0, "works.max_attempts must be at least 1");

        Ok(alexharvest_openalex::Config {
            api_url: self.api.base_url.clone(),
            api_key: self.api.api_key.clone(),
            http: HttpConfig {
                connect_timeout: Duration::from_secs(self.http.connect_timeout),
                request_timeout: Duration::from_secs(self.http.request_timeout),
                pool_max_idle_per_host: self.http.pool_max_idle_per_host,
            },
            discovery: DiscoveryConfig {
                filter: self.discovery.filter.clone(),
                per_page: self.discovery.per_page,
                page_pause: Duration::from_secs_f64(self.discovery.page_pause),
            },
            enrichment: EnrichmentConfig {
                workers: self.enrichment.workers,
            },
            works: WorksConfig {
                per_page: self.works.per_page,
                types: self.works.types.clone(),
                checkpoint_interval: self.works.checkpoint_interval,
                max_requests_per_second: self.works.max_requests_per_second,
                retry: RetryPolicy {
                    max_attempts: self.works.max_attempts,
                },
                policy: WorkPolicy {
                    max_full_authorships: self.works.max_full_authorships,
                    min_publication_year: self.works.min_publication_year,
                },
                max_authors: self.works.max_authors,
            },
            output: self.output.paths(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_runtime_defaults() {
        let runtime = Config::default().to_runtime().unwrap();
        let defaults = alexharvest_openalex::Config::default();
        assert_eq!(runtime.api_url, defaults.api_url);
        assert_eq!(runtime.discovery.filter, defaults.discovery.filter);
        assert_eq!(runtime.discovery.page_pause, Duration::from_secs(1));
        assert_eq!(runtime.enrichment.workers, 5);
        assert_eq!(runtime.works.types, defaults.works.types);
        assert_eq!(runtime.works.retry, RetryPolicy { max_attempts: 3 });
        assert_eq!(runtime.works.policy, WorkPolicy::default());
        assert_eq!(runtime.http.request_timeout, Duration::from_secs(60));
        assert_eq!(runtime.output.works, PathBuf::from("./data/works_detailed.jsonl"));
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("ALEXHARVEST_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${ALEXHARVEST_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("ALEXHARVEST_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[api]
base_url = "http://localhost:9000"
api_key = "literal-key"

[discovery]
filter = "last_known_institutions.country_code:QA"
page_pause = 0.5

[enrichment]
workers = 2

[works]
types = ["article"]
checkpoint_interval = 10
max_authors = 3
min_publication_year = 2000

[output]
dir = "/tmp/harvest"
works = "/tmp/other/works.jsonl"

[http]
request_timeout = 120
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let runtime = config.to_runtime().unwrap();
        assert_eq!(runtime.api_url, "http://localhost:9000");
        assert_eq!(runtime.api_key.as_deref(), Some("literal-key"));
        assert_eq!(runtime.discovery.page_pause, Duration::from_millis(500));
        assert_eq!(runtime.discovery.per_page, 100);
        assert_eq!(runtime.enrichment.workers, 2);
        assert_eq!(runtime.works.types, ["article"]);
        assert_eq!(runtime.works.checkpoint_interval, 10);
        assert_eq!(runtime.works.max_authors, Some(3));
        assert_eq!(runtime.works.policy.min_publication_year, 2000);
        assert_eq!(runtime.works.policy.max_full_authorships, 10);
        assert_eq!(
            runtime.output.authors_basic,
            PathBuf::from("/tmp/harvest/authors_basic.csv")
        );
        assert_eq!(runtime.output.works, PathBuf::from("/tmp/other/works.jsonl"));
        assert_eq!(runtime.http.request_timeout, Duration::from_secs(120));
        assert_eq!(runtime.http.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_rejected() {
        let config: Config = toml::from_str("[enrichment]\nworkers = 0\n").unwrap();
        assert!(config.to_runtime().is_err());

        let config: Config = toml::from_str("[discovery]\npage_pause = -1.0\n").unwrap();
        assert!(config.to_runtime().is_err());
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alexharvest.toml");
        std::fs::write(&path, "[works\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("alexharvest.toml"));
    }
}
