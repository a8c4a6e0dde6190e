use std::sync::Arc;

use ainews_core::{Error, NewsSource, Page, PageFetcher, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

pub mod anthropic;
pub mod deepseek;
pub mod grok;
pub mod groq;
pub mod meta;
pub mod openai;

pub use anthropic::AnthropicScraper;
pub use deepseek::DeepSeekScraper;
pub use grok::GrokScraper;
pub use groq::GroqScraper;
pub use meta::MetaScraper;
pub use openai::OpenAiScraper;

pub type BoxedScraper = Box<dyn Scraper>;

/// Builds a scraper around the fetcher it will own.
pub type ScraperFactory = fn(Arc<dyn PageFetcher>) -> BoxedScraper;

/// Title, link and date read from one listing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Teaser {
    pub title: String,
    pub link: String,
    pub publish_date: Option<DateTime<Utc>>,
}

/// Per-site extraction rules.
///
/// Implementors describe *where* things live in one blog's markup; the
/// provided methods and [`ScraperManager`](crate::ScraperManager) own the
/// listing → teaser → detail-page flow. Parsed documents only ever appear in
/// the synchronous methods, so no `Html` is held across an await.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn source(&self) -> NewsSource;

    /// Page enumerating the article teasers
    fn listing_url(&self) -> &str;

    /// Origin that relative links are resolved against
    fn origin(&self) -> &str;

    fn fetcher(&self) -> &dyn PageFetcher;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>>;

    fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>>;

    /// Never empty: falls back to [`NO_TITLE`](ainews_core::NO_TITLE).
    fn extract_title(&self, entry: ElementRef<'_>) -> Result<String>;

    /// Absolute link of the entry; an error drops the entry.
    fn extract_link(&self, entry: ElementRef<'_>) -> Result<String>;

    fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>>;

    fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>>;

    /// Paragraph and list-item blocks of the content container, in document order
    fn content_blocks<'a>(&self, container: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        utils::select_all(container, "p, li")
    }

    fn read_teaser(&self, entry: ElementRef<'_>) -> Result<Teaser> {
        let title = self.extract_title(entry)?;
        let link = self.extract_link(entry)?;
        let publish_date = self.extract_publish_date(entry);
        Ok(Teaser {
            title,
            link,
            publish_date,
        })
    }

    /// Reads every teaser of a listing page. The outer error means the listing
    /// itself is unusable; inner errors belong to single entries.
    fn read_listing(&self, page: &Page) -> Result<Vec<Result<Teaser>>> {
        let document = page.document();
        let listing = self.locate_listing(&document).ok_or_else(|| {
            Error::ListingUnavailable(format!("no listing container on {}", self.listing_url()))
        })?;
        let entries = self.enumerate_entries(listing)?;
        debug!(source = %self.source(), entries = entries.len(), "enumerated listing entries");

        Ok(entries
            .into_iter()
            .map(|entry| {
                self.read_teaser(entry)
                    .map_err(|e| Error::EntryExtraction(e.to_string()))
            })
            .collect())
    }

    /// Body text of a fetched detail page, or `None` without a content container.
    fn content_from_page(&self, page: &Page) -> Option<String> {
        let document = page.document();
        let Some(container) = self.locate_content(&document) else {
            warn!(url = %page.url, "content container not found");
            return None;
        };
        match self.content_blocks(container) {
            Ok(blocks) => Some(utils::join_blocks(blocks)),
            Err(e) => {
                warn!(url = %page.url, error = %e, "failed to select content blocks");
                None
            }
        }
    }

    /// Fetch an article and extract its body. Every failure yields `None`.
    async fn extract_content(&self, url: &str) -> Option<String> {
        let page = match self.fetcher().fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(%url, error = %e, "failed to fetch article");
                return None;
            }
        };
        if !page.is_success() {
            warn!(%url, status = page.status, "article page could not be loaded");
            return None;
        }
        self.content_from_page(&page)
    }
}

/// Returns the factory of every known source
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        anthropic::factory as ScraperFactory,
        deepseek::factory as ScraperFactory,
        groq::factory as ScraperFactory,
        grok::factory as ScraperFactory,
        meta::factory as ScraperFactory,
        openai::factory as ScraperFactory,
    ]
}

/// Common utilities for scrapers
pub mod utils {
    use super::*;
    use ainews_core::{DateNormalizer, NO_TITLE};
    use scraper::Selector;
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {}", css, e)))
    }

    pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
        let selector = selector(css)?;
        let first = scope.select(&selector).next();
        Ok(first)
    }

    pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
        let selector = selector(css)?;
        let all = scope.select(&selector).collect();
        Ok(all)
    }

    /// First match in the whole document; a bad selector is logged and treated as no match.
    pub fn find_in_document<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
        select_first(document.root_element(), css).unwrap_or_else(|e| {
            warn!(error = %e, "selector failed");
            None
        })
    }

    pub fn extract_text(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().trim().to_string()
    }

    /// Trimmed text of the first `css` match, sentinel when missing or blank.
    pub fn title_from(entry: ElementRef<'_>, css: &str) -> Result<String> {
        let title = select_first(entry, css)?.map(extract_text);
        Ok(title_or_sentinel(title))
    }

    pub fn title_or_sentinel(title: Option<String>) -> String {
        title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string())
    }

    /// Trimmed `href` of `element` resolved against `origin`.
    pub fn link_of(element: ElementRef<'_>, origin: &str) -> Result<String> {
        let href = element
            .value()
            .attr("href")
            .ok_or_else(|| Error::Scraping("link element has no href".to_string()))?;
        normalize_link(origin, href)
    }

    /// `href` of the first `css` match within `entry`.
    pub fn link_from(entry: ElementRef<'_>, css: &str, origin: &str) -> Result<String> {
        let element = select_first(entry, css)?
            .ok_or_else(|| Error::Scraping(format!("no link element matching {:?}", css)))?;
        link_of(element, origin)
    }

    /// Absolute hrefs pass through untouched; anything else is joined onto
    /// `origin`, which percent-encodes the path and resolves dot segments.
    pub fn normalize_link(origin: &str, href: &str) -> Result<String> {
        let href = href.trim();
        if href.is_empty() {
            return Err(Error::Scraping("empty href".to_string()));
        }
        if href.starts_with("http") {
            return Ok(href.to_string());
        }
        let joined = parse_url(origin)?
            .join(href)
            .map_err(|e| Error::InvalidUrl(format!("{} + {}: {}", origin, href, e)))?;
        Ok(joined.to_string())
    }

    /// Date of the first `css` match within `entry`, `None` when absent or unparseable.
    pub fn date_from(entry: ElementRef<'_>, css: &str, dates: &DateNormalizer) -> Option<DateTime<Utc>> {
        let element = select_first(entry, css).ok().flatten()?;
        dates.normalize(&extract_text(element))
    }

    /// Trimmed block texts, empties dropped, joined without a separator.
    pub fn join_blocks<'a>(blocks: impl IntoIterator<Item = ElementRef<'a>>) -> String {
        blocks
            .into_iter()
            .map(extract_text)
            .filter(|text| !text.is_empty())
            .collect()
    }
}
