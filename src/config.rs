//! Scrape configuration.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. Command-line flags and their environment variables (see [`crate::cli`])
//! 2. An optional YAML file passed with `--config`
//! 3. The defaults below, which target the Wiley table of contents the
//!    scraper was written for
//!
//! # Example File
//!
//! ```yaml
//! page_url: https://onlinelibrary.wiley.com/toc/14764431/0/0
//! base_url: https://onlinelibrary.wiley.com/
//! selector: a.issue-item__title
//! min_articles: 5
//! limit: 1000
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_PAGE_URL: &str = "https://onlinelibrary.wiley.com/toc/14764431/0/0";
pub const DEFAULT_BASE_URL: &str = "https://onlinelibrary.wiley.com/";
pub const DEFAULT_SELECTOR: &str = "a.issue-item__title";
pub const DEFAULT_MIN_ARTICLES: usize = 5;
pub const DEFAULT_MAX_ARTICLES: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What to scrape and how many articles to keep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    /// The listing page to fetch.
    pub page_url: Url,
    /// Base against which relative article links are resolved.
    pub base_url: Url,
    /// CSS selector matching one link element per article.
    pub selector: String,
    /// A scrape yielding fewer articles than this is treated as broken.
    pub min_articles: usize,
    /// Maximum number of articles the store retains (0 = unbounded).
    pub limit: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            page_url: Url::parse(DEFAULT_PAGE_URL).expect("default page URL is valid"),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            selector: DEFAULT_SELECTOR.to_string(),
            min_articles: DEFAULT_MIN_ARTICLES,
            limit: DEFAULT_MAX_ARTICLES,
        }
    }
}

impl ScrapeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

/// Read a [`ScrapeConfig`] from a YAML file. Missing keys take their defaults.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<ScrapeConfig, ConfigError> {
    let yaml = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ScrapeConfig::from_yaml(&yaml).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    info!(?config, "Loaded scrape configuration");
    Ok(config)
}
