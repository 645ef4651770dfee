mod client;
mod item;

use std::time::Duration;

use anyhow::{Result, ensure};
use thiserror::Error;

pub use client::{fetch_items, update_item_position};
pub use item::Item;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport failed: {0}")]
    Network(String),
    #[error("store rate limit exceeded")]
    RateLimited,
    #[error("item not found in store")]
    NotFound,
    #[error("store rejected credentials")]
    Unauthorized,
    #[error("store returned HTTP {0}")]
    Http(u16),
    #[error("malformed store payload: {0}")]
    Malformed(String),
}

#[derive(Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    agent: ureq::Agent,
}

impl StoreConfig {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "store URL must start with http:// or https://, got {base_url:?}"
        );

        let base_url = base_url.trim_end_matches('/').to_owned();
        ensure!(
            base_url.len() > "https://".len(),
            "store URL {base_url:?} has no host"
        );

        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let agent = ureq::builder()
            .timeout(Duration::from_secs(10))
            .build();

        Ok(Self {
            base_url,
            api_key,
            agent,
        })
    }

    pub(in crate::store) fn agent(&self) -> &ureq::Agent {
        &self.agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_non_http_urls() {
        assert!(StoreConfig::new("ftp://stock.example", None).is_err());
        assert!(StoreConfig::new("stock.example", None).is_err());
        assert!(StoreConfig::new("https://", None).is_err());
    }

    #[test]
    fn config_normalizes_trailing_slash_and_blank_key() {
        let config = StoreConfig::new("https://stock.example/api/", Some("  ".to_owned()))
            .expect("valid config");
        assert_eq!(config.base_url, "https://stock.example/api");
        assert!(config.api_key.is_none());
    }
}
