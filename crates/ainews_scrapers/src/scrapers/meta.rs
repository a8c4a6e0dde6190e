use std::sync::Arc;

use ainews_core::{DateNormalizer, NewsSource, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};

use crate::scrapers::{utils, BoxedScraper, Scraper};

pub fn factory(fetcher: Arc<dyn PageFetcher>) -> BoxedScraper {
    Box::new(MetaScraper::new(fetcher))
}

#[derive(Clone)]
pub struct MetaScraper {
    fetcher: Arc<dyn PageFetcher>,
    dates: DateNormalizer,
}

impl MetaScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            dates: DateNormalizer::new(),
        }
    }

    const BASE_URL: &'static str = "https://ai.meta.com";
    const LISTING_URL: &'static str = "https://ai.meta.com/blog/";
}

#[async_trait]
impl Scraper for MetaScraper {
    fn source(&self) -> NewsSource {
        NewsSource::Meta
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
        vec!["meta", "llama"]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div._7h8s")
    }

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(listing, "div._amda")
    }

    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::title_from(entry, "a._amcw._amdf")
    }

    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::link_from(entry, "a._amcw._amdf", self.origin())
    }

    // The meta row holds a category label and the date in sibling divs; the
    // first one with text decides.
    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
        let row = utils::select_first(entry, "div._amdc").ok().flatten()?;
        let text = utils::select_all(row, "div._amdj")
            .ok()?
            .into_iter()
            .map(utils::extract_text)
            .find(|text| !text.is_empty())?;
        self.dates.normalize(&text)
    }

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div._a5ci")
    }
}
