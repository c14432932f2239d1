//! Configuration for the Coveo adapter.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{CoveoError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of documents per Push API batch.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Default `numberOfResults` sent with every search request.
pub const DEFAULT_RESULTS_PER_QUERY: u32 = 1000;

/// Names of the corpus fields holding the title and the body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Title field, passed through to Coveo untouched.
    #[serde(default = "default_title_field")]
    pub title: String,

    /// Body field, compressed into `compressedBinaryData` and dropped.
    #[serde(default = "default_body_field")]
    pub body: String,
}

fn default_title_field() -> String {
    "title".to_string()
}

fn default_body_field() -> String {
    "text".to_string()
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            title: default_title_field(),
            body: default_body_field(),
        }
    }
}

impl FieldMapping {
    fn validate(&self) -> Result<()> {
        if self.title.is_empty() || self.body.is_empty() {
            return Err(CoveoError::Config(
                "Field mapping names must not be empty".to_string(),
            ));
        }
        if self.title == self.body {
            return Err(CoveoError::Config(format!(
                "Title and body must map to different fields (both are '{}')",
                self.body
            )));
        }
        Ok(())
    }
}

/// Coveo organization, source and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveoConfig {
    /// Organization id (e.g. "myorgabc123").
    pub organization_id: String,

    /// Push source id inside the organization.
    pub source_id: String,

    /// API key allowed to push content.
    pub api_key: String,

    /// API key allowed to query the search endpoint.
    pub search_api_key: String,

    /// Platform environment suffix: "dev", "qa", "hipaa", or "" for production.
    pub environment: String,

    /// Corpus field names.
    pub fields: FieldMapping,

    /// Maximum documents per Push API batch.
    pub batch_size: usize,

    /// `numberOfResults` sent with every search request, regardless of `top_k`.
    pub results_per_query: u32,

    /// Override for the Push API host (defaults from `environment`).
    pub push_api_base: Option<String>,

    /// Override for the Search API host (defaults from `environment`).
    pub search_api_base: Option<String>,

    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,

    /// Treat the source as already populated and never index.
    pub assume_indexed: bool,

    /// Draw progress bars while indexing and searching.
    pub show_progress: bool,
}

impl Default for CoveoConfig {
    fn default() -> Self {
        Self {
            organization_id: String::new(),
            source_id: String::new(),
            api_key: String::new(),
            search_api_key: String::new(),
            environment: "dev".to_string(),
            fields: FieldMapping::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
            push_api_base: None,
            search_api_base: None,
            timeout_secs: None,
            assume_indexed: false,
            show_progress: true,
        }
    }
}

impl CoveoConfig {
    /// Base URL of the Push API.
    pub fn push_api_base(&self) -> String {
        match &self.push_api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://api{}.cloud.coveo.com", self.environment),
        }
    }

    /// Base URL of the Search API.
    pub fn search_api_base(&self) -> String {
        match &self.search_api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://platform{}.cloud.coveo.com", self.environment),
        }
    }

    /// Batch size as a non-zero count.
    pub fn batch_size(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| CoveoError::Config("Batch size must be at least 1".to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.organization_id.is_empty() {
            return Err(CoveoError::Config(
                "Organization id is required. Set COVEO_ORGANIZATION_ID environment variable or add to config file.".to_string(),
            ));
        }

        if self.source_id.is_empty() {
            return Err(CoveoError::Config(
                "Source id is required. Set COVEO_SOURCE_ID environment variable or add to config file.".to_string(),
            ));
        }

        if self.api_key.is_empty() {
            return Err(CoveoError::Config(
                "Push API key is required. Set COVEO_API_KEY environment variable or add to config file.".to_string(),
            ));
        }

        if self.search_api_key.is_empty() {
            return Err(CoveoError::Config(
                "Search API key is required. Set COVEO_SEARCH_API_KEY environment variable or add to config file.".to_string(),
            ));
        }

        self.batch_size()?;

        if self.results_per_query == 0 {
            return Err(CoveoError::Config(
                "results_per_query must be at least 1".to_string(),
            ));
        }

        self.fields.validate()
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Coveo settings
    pub coveo: CoveoConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    coveo: Option<CoveoFileSection>,
}

#[derive(Debug, Deserialize)]
struct CoveoFileSection {
    organization_id: Option<String>,
    source_id: Option<String>,
    api_key: Option<String>,
    search_api_key: Option<String>,
    environment: Option<String>,
    fields: Option<FieldMapping>,
    batch_size: Option<usize>,
    results_per_query: Option<u32>,
    push_api_base: Option<String>,
    search_api_base: Option<String>,
    timeout_secs: Option<u64>,
    assume_indexed: Option<bool>,
    show_progress: Option<bool>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (COVEO_ORGANIZATION_ID, COVEO_API_KEY, ...)
    /// 2. Config file (~/.config/coveo-beir/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path().filter(|path| path.exists()) {
            config = Self::load_from_file(&config_path)?;
        }

        config.apply_env(|key| env::var(key).ok());

        Ok(config)
    }

    /// Override values from an environment-like lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let coveo = &mut self.coveo;

        if let Some(org) = lookup("COVEO_ORGANIZATION_ID") {
            coveo.organization_id = org;
        }
        if let Some(source) = lookup("COVEO_SOURCE_ID") {
            coveo.source_id = source;
        }
        if let Some(key) = lookup("COVEO_API_KEY") {
            coveo.api_key = key;
        }
        if let Some(key) = lookup("COVEO_SEARCH_API_KEY") {
            coveo.search_api_key = key;
        }
        if let Some(environment) = lookup("COVEO_ENVIRONMENT") {
            coveo.environment = environment;
        }
        if let Some(batch_size) = lookup("COVEO_BATCH_SIZE") {
            if let Ok(size) = batch_size.parse() {
                coveo.batch_size = size;
            }
        }
        if let Some(base) = lookup("COVEO_PUSH_API_BASE") {
            coveo.push_api_base = Some(base);
        }
        if let Some(base) = lookup("COVEO_SEARCH_API_BASE") {
            coveo.search_api_base = Some(base);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoveoError::io(path, e))?;

        let file_config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|e| CoveoError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(section) = file_config.coveo {
            let coveo = &mut config.coveo;
            if let Some(org) = section.organization_id {
                coveo.organization_id = org;
            }
            if let Some(source) = section.source_id {
                coveo.source_id = source;
            }
            if let Some(key) = section.api_key {
                coveo.api_key = key;
            }
            if let Some(key) = section.search_api_key {
                coveo.search_api_key = key;
            }
            if let Some(environment) = section.environment {
                coveo.environment = environment;
            }
            if let Some(fields) = section.fields {
                coveo.fields = fields;
            }
            if let Some(batch_size) = section.batch_size {
                coveo.batch_size = batch_size;
            }
            if let Some(n) = section.results_per_query {
                coveo.results_per_query = n;
            }
            if section.push_api_base.is_some() {
                coveo.push_api_base = section.push_api_base;
            }
            if section.search_api_base.is_some() {
                coveo.search_api_base = section.search_api_base;
            }
            if section.timeout_secs.is_some() {
                coveo.timeout_secs = section.timeout_secs;
            }
            if let Some(assume) = section.assume_indexed {
                coveo.assume_indexed = assume;
            }
            if let Some(progress) = section.show_progress {
                coveo.show_progress = progress;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "coveo-beir")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        self.coveo.validate()
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_credentials(
        organization_id: impl Into<String>,
        source_id: impl Into<String>,
        api_key: impl Into<String>,
        search_api_key: impl Into<String>,
    ) -> Self {
        Self {
            coveo: CoveoConfig {
                organization_id: organization_id.into(),
                source_id: source_id.into(),
                api_key: api_key.into(),
                search_api_key: search_api_key.into(),
                ..Default::default()
            },
        }
    }
}
