use std::time::Duration;

use fireball_core::{Config, Fetcher, FireballError, RawCatalog, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::debug;

/// Fetches the fireball catalog over HTTP.
pub struct HttpFetcher {
    client: Client,
    url: String,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_url(cfg, cfg.catalog_url())
    }

    pub fn with_url(cfg: &Config, url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| FireballError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, url, cfg.user_agent.clone()))
    }

    pub fn with_client(client: Client, url: String, user_agent: String) -> Self {
        HttpFetcher {
            client,
            url,
            user_agent,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self) -> Result<RawCatalog> {
        debug!("GET {}", self.url);
        let resp = self
            .client
            .get(&self.url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .map_err(network)?
            .error_for_status()
            .map_err(network)?;
        let bytes = resp.bytes().map_err(network)?;
        debug!("received {} bytes", bytes.len());
        RawCatalog::from_bytes(&bytes)
    }
}

fn network(err: reqwest::Error) -> FireballError {
    FireballError::Network(err.to_string())
}
