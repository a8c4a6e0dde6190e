use ainews_core::{Page, PageFetcher, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ScrapeConfig;

/// `PageFetcher` over a dedicated `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!(%url, status, bytes = body.len(), "fetched page");
        Ok(Page::new(status, final_url, body))
    }
}
