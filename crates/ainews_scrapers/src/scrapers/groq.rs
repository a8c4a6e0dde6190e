use std::sync::Arc;

use ainews_core::{DateNormalizer, NewsSource, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};

use crate::scrapers::{utils, BoxedScraper, Scraper};

pub fn factory(fetcher: Arc<dyn PageFetcher>) -> BoxedScraper {
    Box::new(GroqScraper::new(fetcher))
}

/// groq.com blog, an Elementor archive template.
#[derive(Clone)]
pub struct GroqScraper {
    fetcher: Arc<dyn PageFetcher>,
    dates: DateNormalizer,
}

impl GroqScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            dates: DateNormalizer::new(),
        }
    }

    const BASE_URL: &'static str = "https://groq.com";
    const LISTING_URL: &'static str = "https://groq.com/category/blog/";
}

#[async_trait]
impl Scraper for GroqScraper {
    fn source(&self) -> NewsSource {
        NewsSource::Groq
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
        vec!["groq"]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div.elementor.elementor-3577.elementor-location-archive")
    }

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(listing, "div.elementor.elementor-3783")
    }

    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::title_from(entry, "h2.elementor-heading-title a")
    }

    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::link_from(
            entry,
            "div.elementor-widget-container h2.elementor-heading-title a",
            self.origin(),
        )
    }

    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
        utils::date_from(entry, "div.elementor-widget-post-info time", &self.dates)
    }

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div.elementor-widget-theme-post-content")
    }

    fn content_blocks<'a>(&self, container: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(
            container,
            "div.elementor-widget-container p, div.elementor-widget-container li",
        )
    }
}
