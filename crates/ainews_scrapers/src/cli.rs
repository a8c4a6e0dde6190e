use ainews_core::Result;
use clap::Subcommand;

use crate::manager::{ScraperManager, ScraperStatus, SweepReport};

#[derive(Debug, Subcommand)]
pub enum ScraperCommands {
    /// Scrape sources and store new articles
    Scrape {
        /// Sources to scrape by name or alias (e.g. openai, claude); all when omitted
        sources: Vec<String>,
    },
    /// List available scrapers
    List,
}

pub async fn handle_command(command: ScraperCommands, manager: &mut ScraperManager) -> Result<()> {
    match command {
        ScraperCommands::Scrape { sources } => {
            manager.retain_sources(&sources)?;
            println!("Scraping {} source(s)", manager.scrapers().len());
            let report = manager.scrape_and_store().await;
            print_report(&report);
        }
        ScraperCommands::List => {
            println!("Available scrapers:");
            for scraper in manager.scrapers() {
                println!(
                    "  {:<10} {:<40} aliases: {}",
                    scraper.source().to_string(),
                    scraper.listing_url(),
                    scraper.cli_names().join(", ")
                );
            }
        }
    }
    Ok(())
}

fn print_report(report: &SweepReport) {
    for outcome in &report.outcomes {
        let emoji = match outcome.status {
            ScraperStatus::Success => "✅",
            ScraperStatus::Partial => "⚠️",
            ScraperStatus::Failed => "❌",
        };
        println!(
            "{} {} - {} articles, {} failed entries, {} without content ({:.1}s)",
            emoji,
            outcome.source,
            outcome.stats.successful,
            outcome.stats.failed,
            outcome.stats.missing_content,
            outcome.elapsed.as_secs_f64()
        );
        if let Some(error) = &outcome.error {
            println!("   {}", error);
        }
    }
    println!(
        "Stored {} new, skipped {} known, {} failed",
        report.ingest.inserted, report.ingest.skipped, report.ingest.failed
    );
}
