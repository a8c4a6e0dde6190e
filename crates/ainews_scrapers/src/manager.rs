use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ainews_core::{ArticleRecord, ArticleStorage, Error, NewsSource, Result};
use ainews_storage::{IngestReport, Ingestor};
use serde::Serialize;
use tokio::time::sleep;

use crate::config::ScrapeConfig;
use crate::fetch::HttpFetcher;
use crate::logging::Logger;
use crate::scrapers::{get_scraper_factories, BoxedScraper, Scraper, Teaser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeStats {
    /// Entries found on the listing page.
    pub attempted: usize,
    /// Entries that became a record.
    pub successful: usize,
    /// Entries dropped because title or link extraction failed.
    pub failed: usize,
    /// Records whose detail page yielded no content.
    pub missing_content: usize,
}

/// Result of scraping one source.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub source: NewsSource,
    pub status: ScraperStatus,
    pub articles: Vec<ArticleRecord>,
    pub stats: ScrapeStats,
    pub elapsed: Duration,
    /// Why the source failed as a whole.
    pub error: Option<String>,
}

impl ScrapeOutcome {
    fn failed(source: NewsSource, error: &Error, elapsed: Duration) -> Self {
        Self {
            source,
            status: ScraperStatus::Failed,
            articles: Vec::new(),
            stats: ScrapeStats::default(),
            elapsed,
            error: Some(error.to_string()),
        }
    }

    fn status_for(stats: &ScrapeStats) -> ScraperStatus {
        if stats.failed > 0 || stats.missing_content > 0 {
            ScraperStatus::Partial
        } else {
            ScraperStatus::Success
        }
    }
}

/// Outcome of a full scrape-and-store sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub outcomes: Vec<ScrapeOutcome>,
    pub ingest: IngestReport,
}

/// Drives the registered scrapers one after another and hands their records
/// to the [`Ingestor`].
pub struct ScraperManager {
    config: ScrapeConfig,
    scrapers: Vec<BoxedScraper>,
    ingestor: Ingestor,
}

impl ScraperManager {
    pub fn new(storage: Arc<dyn ArticleStorage>, config: ScrapeConfig) -> Self {
        Self {
            config,
            scrapers: Vec::new(),
            ingestor: Ingestor::new(storage),
        }
    }

    /// Registers every known source, each with its own HTTP client.
    pub fn with_all_scrapers(storage: Arc<dyn ArticleStorage>, config: ScrapeConfig) -> Result<Self> {
        let mut manager = Self::new(storage, config);
        for factory in get_scraper_factories() {
            let fetcher = Arc::new(HttpFetcher::new(&manager.config)?);
            manager.add_scraper(factory(fetcher));
        }
        Ok(manager)
    }

    pub fn add_scraper(&mut self, scraper: BoxedScraper) {
        self.scrapers.push(scraper);
    }

    pub fn scrapers(&self) -> &[BoxedScraper] {
        &self.scrapers
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        self.ingestor.storage()
    }

    /// Keeps only the scrapers named in `names`, by source name or CLI alias.
    /// An empty list keeps everything.
    pub fn retain_sources(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            if !self.scrapers.iter().any(|s| Self::matches(s.as_ref(), name)) {
                return Err(Error::Scraping(format!("No scraper found for {}", name)));
            }
        }
        self.scrapers
            .retain(|s| names.iter().any(|name| Self::matches(s.as_ref(), name)));
        Ok(())
    }

    fn matches(scraper: &dyn Scraper, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        NewsSource::from_str(&wanted).map_or(false, |source| source == scraper.source())
            || scraper.cli_names().contains(&wanted.as_str())
    }

    async fn fetch_listing(&self, scraper: &dyn Scraper) -> Result<Vec<Result<Teaser>>> {
        let url = scraper.listing_url();
        let page = scraper
            .fetcher()
            .fetch(url)
            .await
            .map_err(|e| Error::ListingUnavailable(format!("{}: {}", url, e)))?;
        if !page.is_success() {
            return Err(Error::ListingUnavailable(format!(
                "{} returned HTTP {}",
                url, page.status
            )));
        }
        scraper.read_listing(&page)
    }

    /// Scrape one source. Never fails as a whole: an unusable listing gives a
    /// `Failed` outcome, a bad entry is dropped and counted.
    pub async fn run(&self, scraper: &dyn Scraper) -> ScrapeOutcome {
        let started = Instant::now();
        let source = scraper.source();
        let logger = Logger::new().with_prefix(format!("[{}]", source));
        logger.info(&format!("Scraping {}", scraper.listing_url()));

        let teasers = match self.fetch_listing(scraper).await {
            Ok(teasers) => teasers,
            Err(e) => {
                logger.warn(&format!("Listing unavailable: {}", e));
                return ScrapeOutcome::failed(source, &e, started.elapsed());
            }
        };

        let mut stats = ScrapeStats {
            attempted: teasers.len(),
            ..ScrapeStats::default()
        };
        let mut articles = Vec::with_capacity(teasers.len());

        for (index, teaser) in teasers.into_iter().enumerate() {
            let teaser = match teaser {
                Ok(teaser) => teaser,
                Err(e) => {
                    logger.warn(&format!("Skipping entry {}: {}", index + 1, e));
                    stats.failed += 1;
                    continue;
                }
            };

            if !articles.is_empty() && !self.config.per_article_delay.is_zero() {
                sleep(self.config.per_article_delay).await;
            }

            logger.debug(&format!("Fetching {}", teaser.link));
            let content = scraper.extract_content(&teaser.link).await;
            if content.is_none() {
                logger.warn(&format!("No content for {}", teaser.link));
                stats.missing_content += 1;
            }
            stats.successful += 1;

            articles.push(ArticleRecord {
                source,
                title: teaser.title,
                link: teaser.link,
                publish_date: teaser.publish_date,
                content,
            });
        }

        let status = ScrapeOutcome::status_for(&stats);
        logger.info(&format!(
            "Scraped {} of {} entries ({} without content)",
            stats.successful, stats.attempted, stats.missing_content
        ));

        ScrapeOutcome {
            source,
            status,
            articles,
            stats,
            elapsed: started.elapsed(),
            error: None,
        }
    }

    async fn pause_between_sources(&self, index: usize) {
        if index > 0 && !self.config.per_source_delay.is_zero() {
            sleep(self.config.per_source_delay).await;
        }
    }

    /// Scrape every registered source, strictly one after another.
    pub async fn run_all(&self) -> Vec<ScrapeOutcome> {
        let mut outcomes = Vec::with_capacity(self.scrapers.len());
        for (index, scraper) in self.scrapers.iter().enumerate() {
            self.pause_between_sources(index).await;
            outcomes.push(self.run(scraper.as_ref()).await);
        }
        outcomes
    }

    /// Scrape every source and store what is new. Each source is ingested as
    /// soon as it finishes.
    pub async fn scrape_and_store(&self) -> SweepReport {
        let mut report = SweepReport {
            outcomes: Vec::with_capacity(self.scrapers.len()),
            ingest: IngestReport::default(),
        };

        for (index, scraper) in self.scrapers.iter().enumerate() {
            self.pause_between_sources(index).await;
            let outcome = self.run(scraper.as_ref()).await;
            report.ingest.merge(self.ingestor.ingest(&outcome.articles).await);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            sources = report.outcomes.len(),
            inserted = report.ingest.inserted,
            skipped = report.ingest.skipped,
            failed = report.ingest.failed,
            "sweep finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::utils;
    use crate::test_utils::StaticFetcher;
    use ainews_core::PageFetcher;
    use ainews_storage::MemoryStorage;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use scraper::{ElementRef, Html};

    const LISTING_URL: &str = "https://example.test/news";

    /// Entries marked `data-broken` fail title extraction.
    struct FixtureScraper {
        source: NewsSource,
        fetcher: Arc<StaticFetcher>,
    }

    #[async_trait]
    impl Scraper for FixtureScraper {
        fn source(&self) -> NewsSource {
            self.source
        }

        fn listing_url(&self) -> &str {
            LISTING_URL
        }

        fn origin(&self) -> &str {
            "https://example.test"
        }

        fn fetcher(&self) -> &dyn PageFetcher {
            self.fetcher.as_ref()
        }

        fn cli_names(&self) -> Vec<&str> {
            vec!["fixture"]
        }

        fn locate_listing<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
            utils::find_in_document(document, "ul#posts")
        }

        fn enumerate_entries<'a>(&self, listing: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
            utils::select_all(listing, "li")
        }

        fn extract_title(&self, entry: ElementRef<'_>) -> Result<String> {
            if entry.value().attr("data-broken").is_some() {
                return Err(Error::Scraping("title node unreadable".to_string()));
            }
            utils::title_from(entry, "h2")
        }

        fn extract_link(&self, entry: ElementRef<'_>) -> Result<String> {
            utils::link_from(entry, "a", self.origin())
        }

        fn extract_publish_date(&self, entry: ElementRef<'_>) -> Option<DateTime<Utc>> {
            utils::date_from(entry, "time", &ainews_core::DateNormalizer::new())
        }

        fn locate_content<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
            utils::find_in_document(document, "article")
        }
    }

    const THREE_ENTRIES: &str = r#"
        <ul id="posts">
          <li><a href="/news/one"><h2>One</h2></a><time>March 3, 2024</time></li>
          <li data-broken="1"><a href="/news/two"><h2>Two</h2></a></li>
          <li><a href="/news/three"><h2>Three</h2></a><time>soon</time></li>
        </ul>
    "#;

    fn fixture(fetcher: StaticFetcher) -> (Arc<StaticFetcher>, Box<FixtureScraper>) {
        let fetcher = Arc::new(fetcher);
        let scraper = Box::new(FixtureScraper {
            source: NewsSource::Groq,
            fetcher: fetcher.clone(),
        });
        (fetcher, scraper)
    }

    fn manager(config: ScrapeConfig) -> ScraperManager {
        ScraperManager::new(Arc::new(MemoryStorage::new()), config)
    }

    fn healthy_site() -> StaticFetcher {
        StaticFetcher::new()
            .with_page(LISTING_URL, THREE_ENTRIES)
            .with_page("https://example.test/news/one", "<article><p>First body</p></article>")
            .with_page("https://example.test/news/three", "<article><p>Third</p><ul><li>body</li></ul></article>")
    }

    #[tokio::test]
    async fn test_failing_entry_is_skipped() {
        let (_, scraper) = fixture(healthy_site());
        let outcome = manager(ScrapeConfig::without_delays()).run(scraper.as_ref()).await;

        assert_eq!(outcome.status, ScraperStatus::Partial);
        assert_eq!(outcome.articles.len(), 2);
        assert_eq!(
            outcome.stats,
            ScrapeStats {
                attempted: 3,
                successful: 2,
                failed: 1,
                missing_content: 0
            }
        );

        let first = &outcome.articles[0];
        assert_eq!(first.source, NewsSource::Groq);
        assert_eq!(first.title, "One");
        assert_eq!(first.link, "https://example.test/news/one");
        assert_eq!(first.content.as_deref(), Some("First body"));
        assert!(first.publish_date.is_some());

        let third = &outcome.articles[1];
        assert_eq!(third.link, "https://example.test/news/three");
        assert_eq!(third.publish_date, None);
        assert_eq!(third.content.as_deref(), Some("Thirdbody"));
    }

    #[tokio::test]
    async fn test_missing_content_still_yields_record() {
        let site = StaticFetcher::new()
            .with_page(
                LISTING_URL,
                r#"<ul id="posts"><li><a href="/a"><h2>A</h2></a></li><li><a href="/b"></a></li></ul>"#,
            )
            .with_page("https://example.test/a", "<div>no article element</div>")
            .with_status("https://example.test/b", 503, "<article><p>busy</p></article>");
        let (_, scraper) = fixture(site);
        let outcome = manager(ScrapeConfig::without_delays()).run(scraper.as_ref()).await;

        assert_eq!(outcome.articles.len(), 2);
        assert!(outcome.articles.iter().all(|a| a.content.is_none()));
        assert_eq!(outcome.articles[1].title, "No Title");
        assert_eq!(outcome.stats.missing_content, 2);
        assert_eq!(outcome.status, ScraperStatus::Partial);
    }

    #[tokio::test]
    async fn test_unavailable_listing_fails_source() {
        let cases = [
            (StaticFetcher::new().with_status(LISTING_URL, 500, THREE_ENTRIES), "returned HTTP 500"),
            (StaticFetcher::new().with_page(LISTING_URL, "<main>new layout</main>"), "no listing container"),
            (StaticFetcher::new(), "connection refused"),
        ];

        for (site, reason) in cases {
            let (fetcher, scraper) = fixture(site);
            let outcome = manager(ScrapeConfig::without_delays()).run(scraper.as_ref()).await;
            assert_eq!(outcome.status, ScraperStatus::Failed);
            assert!(outcome.articles.is_empty());
            let error = outcome.error.unwrap();
            assert!(error.contains(reason), "{:?} does not mention {:?}", error, reason);
            assert_eq!(fetcher.requested(), [LISTING_URL]);
        }
    }

    #[tokio::test]
    async fn test_clean_run_is_success() {
        let site = StaticFetcher::new()
            .with_page(LISTING_URL, r#"<ul id="posts"><li><a href="/a"><h2>A</h2></a></li></ul>"#)
            .with_page("https://example.test/a", "<article><p>body</p></article>");
        let (_, scraper) = fixture(site);
        let outcome = manager(ScrapeConfig::without_delays()).run(scraper.as_ref()).await;
        assert_eq!(outcome.status, ScraperStatus::Success);
        assert_eq!(outcome.stats.successful, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_article_delay_between_detail_fetches() {
        let delay = Duration::from_secs(1);
        let site = StaticFetcher::new()
            .with_page(
                LISTING_URL,
                r#"<ul id="posts">
                    <li><a href="/one"><h2>One</h2></a></li>
                    <li><a href="/two"><h2>Two</h2></a></li>
                    <li><a href="/three"><h2>Three</h2></a></li>
                </ul>"#,
            )
            .with_page("https://example.test/one", "<article><p>1</p></article>")
            .with_status("https://example.test/two", 503, "<article><p>busy</p></article>")
            .with_page("https://example.test/three", "<article><p>3</p></article>");
        let (fetcher, scraper) = fixture(site);
        let manager = manager(ScrapeConfig::without_delays().with_delays(delay, Duration::ZERO));

        let outcome = manager.run(scraper.as_ref()).await;
        assert_eq!(outcome.articles.len(), 3);
        assert_eq!(outcome.stats.missing_content, 1);
        assert_eq!(
            fetcher.requested(),
            [
                LISTING_URL,
                "https://example.test/one",
                "https://example.test/two",
                "https://example.test/three"
            ]
        );

        // No pause before the first detail fetch, one before each later
        // fetch, including the one after the 503.
        let times = fetcher.request_times();
        assert_eq!(times[1] - times[0], Duration::ZERO);
        assert_eq!(times[2] - times[1], delay);
        assert_eq!(times[3] - times[2], delay);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let storage: Arc<dyn ArticleStorage> = Arc::new(MemoryStorage::new());
        let mut manager = ScraperManager::new(storage.clone(), ScrapeConfig::without_delays());
        let (_, scraper) = fixture(healthy_site());
        manager.add_scraper(scraper);

        let first = manager.scrape_and_store().await;
        assert_eq!(first.ingest.inserted, 2);
        assert_eq!(first.outcomes.len(), 1);

        let second = manager.scrape_and_store().await;
        assert_eq!(second.ingest.inserted, 0);
        assert_eq!(second.ingest.skipped, 2);
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_all_pauses_between_sources() {
        let delay = Duration::from_secs(2);
        let mut manager = manager(ScrapeConfig::without_delays().with_delays(Duration::ZERO, delay));
        let fetchers = [Arc::new(StaticFetcher::new()), Arc::new(StaticFetcher::new())];
        for (source, fetcher) in [NewsSource::Groq, NewsSource::Meta].into_iter().zip(&fetchers) {
            manager.add_scraper(Box::new(FixtureScraper {
                source,
                fetcher: fetcher.clone(),
            }));
        }

        let started = tokio::time::Instant::now();
        let outcomes = manager.run_all().await;
        let sources: Vec<_> = outcomes.iter().map(|o| o.source).collect();
        assert_eq!(sources, [NewsSource::Groq, NewsSource::Meta]);

        // The first source starts at once, the second after one pause.
        assert_eq!(fetchers[0].request_times()[0] - started, Duration::ZERO);
        assert_eq!(fetchers[1].request_times()[0] - started, delay);
    }

    #[test]
    fn test_retain_sources() {
        let storage: Arc<dyn ArticleStorage> = Arc::new(MemoryStorage::new());
        let mut manager =
            ScraperManager::with_all_scrapers(storage, ScrapeConfig::without_delays()).unwrap();
        assert_eq!(manager.scrapers().len(), NewsSource::ALL.len());

        manager
            .retain_sources(&["OpenAI".to_string(), "claude".to_string()])
            .unwrap();
        let mut kept: Vec<_> = manager.scrapers().iter().map(|s| s.source()).collect();
        kept.sort_by_key(|s| s.as_str());
        assert_eq!(kept, [NewsSource::Anthropic, NewsSource::OpenAi]);

        assert!(manager.retain_sources(&["myspace".to_string()]).is_err());
        assert_eq!(manager.scrapers().len(), 2);
    }
}
