use std::sync::Arc;

use ainews_core::{DateNormalizer, NewsSource, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};

use crate::scrapers::{utils, BoxedScraper, Scraper};

pub fn factory(fetcher: Arc<dyn PageFetcher>) -> BoxedScraper {
    Box::new(AnthropicScraper::new(fetcher))
}

/// anthropic.com/news: every teaser is a bare `<a>` card inside the post list.
#[derive(Clone)]
pub struct AnthropicScraper {
    fetcher: Arc<dyn PageFetcher>,
    dates: DateNormalizer,
}

impl AnthropicScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            dates: DateNormalizer::day_first(),
        }
    }

    const BASE_URL: &'static str = "https://www.anthropic.com";
    const LISTING_URL: &'static str = "https://www.anthropic.com/news/";
}

#[async_trait]
impl Scraper for AnthropicScraper {
    fn source(&self) -> NewsSource {
        NewsSource::Anthropic
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
        vec!["anthropic", "claude"]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "div.PostList_b-postList___Ngqa")
    }

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(listing, "a")
    }

    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::title_from(entry, "h3.PostCard_post-heading__Ob1pu")
    }

    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::link_of(entry, self.origin())
    }

    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
        utils::date_from(entry, "div.PostList_post-date__djrOA", &self.dates)
    }

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "article")
    }

    fn content_blocks<'a>(&self, container: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(
            container,
            "p.ReadingDetail_reading-column__h6GuA, ul.ReadingDetail_reading-column__h6GuA li",
        )
    }
}
