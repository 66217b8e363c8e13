//! Endpoint and transport configuration.
//!
//! Every value has a default pointing at the public politi.dk endpoint, so a
//! config file is only needed to override something. The file is YAML:
//!
//! ```yaml
//! listing:
//!   page_size: 500
//! http:
//!   timeout_secs: 10
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::{info, instrument};

/// Settings for the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Full URL of the listing endpoint.
    pub api_url: String,
    /// Base that relative detail-page links are resolved against.
    pub site_url: String,
    /// Sent as `itemId`.
    pub item_id: String,
    /// Sent as `newsType`.
    pub news_type: String,
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://politi.dk/api/news/getNewsResults".to_string(),
            site_url: "https://politi.dk".to_string(),
            item_id: "90deb0b1-8df0-4a2d-823b-cfd7a5add85f".to_string(),
            news_type: "Døgnrapporter".to_string(),
            page_size: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Base delay for retry backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            retry_base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listing: ListingConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("{path}: {e}")))?;
        let config = Self::from_yaml(&yaml)?;
        if config.listing.page_size == 0 {
            return Err(Error::Config("listing.page_size must be positive".to_string()));
        }
        info!(path, "Loaded configuration");
        Ok(config)
    }
}
