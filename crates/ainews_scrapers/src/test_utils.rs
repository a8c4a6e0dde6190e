use std::collections::HashMap;
use std::sync::Mutex;

use ainews_core::{Error, Page, PageFetcher, Result};
use async_trait::async_trait;
use tokio::time::Instant;

/// Serves canned pages and records every requested URL. Unknown URLs fail
/// like an unreachable host.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, (u16, String)>,
    requested: Mutex<Vec<(String, Instant)>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_status(url, 200, body)
    }

    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    /// When each request was made, on the tokio clock.
    pub fn request_times(&self) -> Vec<Instant> {
        self.requested.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.requested.lock().unwrap().push((url.to_string(), Instant::now()));
        match self.pages.get(url) {
            Some((status, body)) => Ok(Page::new(*status, url, body.as_str())),
            None => Err(Error::Scraping(format!("connection refused: {}", url))),
        }
    }
}
