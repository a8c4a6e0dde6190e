use async_trait::async_trait;
use scraper::Html;

use crate::Result;

/// A fetched page. The body is kept as text so a `Page` can cross await
/// points; parse it with [`Page::document`] inside synchronous code.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`. Transport failures are errors; HTTP error statuses are not.
    async fn fetch(&self, url: &str) -> Result<Page>;
}
