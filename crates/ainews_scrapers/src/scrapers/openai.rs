use std::sync::Arc;

use ainews_core::{DateNormalizer, NewsSource, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::scrapers::{utils, BoxedScraper, Scraper};

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"\b\d{4}\b").unwrap();
}

pub fn factory(fetcher: Arc<dyn PageFetcher>) -> BoxedScraper {
    Box::new(OpenAiScraper::new(fetcher))
}

/// openai.com/news. Teaser cards carry the title only as `aria-label`, and
/// the date sits in one of several unlabelled spans.
#[derive(Clone)]
pub struct OpenAiScraper {
    fetcher: Arc<dyn PageFetcher>,
    dates: DateNormalizer,
}

impl OpenAiScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            dates: DateNormalizer::new(),
        }
    }

    const BASE_URL: &'static str = "https://openai.com";
    const LISTING_URL: &'static str = "https://openai.com/news/";
}

#[async_trait]
impl Scraper for OpenAiScraper {
    fn source(&self) -> NewsSource {
        NewsSource::OpenAi
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
        vec!["openai", "chatgpt"]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "#results")
    }

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(listing, "a")
    }

    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
        let label = entry.value().attr("aria-label").map(str::to_string);
        Ok(utils::title_or_sentinel(label))
    }

    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
        utils::link_of(entry, self.origin())
    }

    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
        let text = utils::select_all(entry, "span")
            .ok()?
            .into_iter()
            .map(utils::extract_text)
            .find(|text| YEAR.is_match(text))?;
        self.dates.normalize(&text)
    }

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        utils::find_in_document(document, "article.mt-2xl")
    }

    fn content_blocks<'a>(&self, container: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(container, "div.prose p span, div.prose li")
    }
}
