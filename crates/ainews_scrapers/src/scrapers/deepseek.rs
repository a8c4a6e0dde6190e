use std::sync::Arc;

use ainews_core::{DateNormalizer, NewsSource, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};

use crate::scrapers::{utils, BoxedScraper, Scraper};

pub fn factory(fetcher: Arc<dyn PageFetcher>) -> BoxedScraper {
    Box::new(DeepSeekScraper::new(fetcher))
}

#[derive(Clone)]
pub struct DeepSeekScraper {
    fetcher: Arc<dyn PageFetcher>,
    dates: DateNormalizer,
}

impl DeepSeekScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            dates: DateNormalizer::new(),
        }
    }

    const BASE_URL: &'static str = "https://www.deepseekv3.com";
    const LISTING_URL: &'static str = "https://www.deepseekv3.com/en/blog";
}

#[async_trait]
impl Scraper for DeepSeekScraper {
    fn source(&self) -> NewsSource {
        NewsSource::DeepSeek
    }

    fn listing_url(&self) -> &str {
        Self::LISTING_URL
    }

    fn origin(&self) -> &str {
        Self::BASE_URL
    }

    fn fetcher(&self) -> &dyn PageFetcher {
        self.fetcher.as_ref()
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["deepseek"]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div.min-h-screen")
    }

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(listing, "div.grid.gap-8 article")
    }

    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::title_from(entry, "a h2")
    }

    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::link_from(entry, "a", self.origin())
    }

    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
        utils::date_from(entry, "div.text-gray-600", &self.dates)
    }

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "article.prose")
    }
}
