use std::sync::Arc;

use ainews_core::{DateNormalizer, NewsSource, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};

use crate::scrapers::{utils, BoxedScraper, Scraper};

pub fn factory(fetcher: Arc<dyn PageFetcher>) -> BoxedScraper {
    Box::new(GrokScraper::new(fetcher))
}

/// x.ai blog. Teaser links are site-relative.
#[derive(Clone)]
pub struct GrokScraper {
    fetcher: Arc<dyn PageFetcher>,
    dates: DateNormalizer,
}

impl GrokScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            dates: DateNormalizer::new(),
        }
    }

    const BASE_URL: &'static str = "https://x.ai";
    const LISTING_URL: &'static str = "https://x.ai/blog";
}

#[async_trait]
impl Scraper for GrokScraper {
    fn source(&self) -> NewsSource {
        NewsSource::Grok
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
        vec!["grok", "xai"]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div.border-top")
    }

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(listing, "div.col")
    }

    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::title_from(entry, "a.blog-teaser_heading__KWHU_ h4")
    }

    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::link_from(entry, "a.blog-teaser_heading__KWHU_", self.origin())
    }

    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
        utils::date_from(entry, "div.blog-teaser_timestamp__hb6gF p", &self.dates)
    }

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div.col-xxl-6")
    }
}
