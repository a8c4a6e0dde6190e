use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ainews_core::{ArticleStorage, Error, NewsSource, Result, StoredArticle};
use ainews_scrapers::{handle_command, init_logging, ScrapeConfig, ScraperCommands, ScraperManager};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;

/// Durations such as `500ms`, `2s`, `1m`, `1h15m`. A bare number means seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut chars = s.trim().chars().peekable();
        let mut parsed_any = false;

        while chars.peek().is_some() {
            let mut number = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                number.push(c);
                chars.next();
            }
            let mut unit = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_alphabetic) {
                unit.push(c);
                chars.next();
            }
            if number.is_empty() {
                return Err(format!("Invalid duration: {}", s));
            }
            let value: u64 = number
                .parse()
                .map_err(|_| format!("Invalid number in duration: {}", number))?;
            let part = match unit.as_str() {
                "ms" => Some(Duration::from_millis(value)),
                "" | "s" => Some(Duration::from_secs(value)),
                "m" => value.checked_mul(60).map(Duration::from_secs),
                "h" => value.checked_mul(3600).map(Duration::from_secs),
                "d" => value.checked_mul(86400).map(Duration::from_secs),
                other => return Err(format!("Invalid duration unit: {}", other)),
            };
            total = part
                .and_then(|part| total.checked_add(part))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            parsed_any = true;
        }

        if !parsed_any {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(total))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape AI lab blogs into a local article store", long_about = None)]
pub struct Cli {
    /// Storage backend: sqlite or memory
    #[arg(long, env = "AINEWS_STORAGE", default_value = "sqlite")]
    storage: String,
    /// Database location for the sqlite backend (path or sqlite: URL)
    #[arg(long, env = "AINEWS_DATABASE_URL")]
    database_url: Option<String>,
    /// Pause between two article fetches of the same source
    #[arg(long, default_value = "1s")]
    article_delay: HumanDuration,
    /// Pause between two sources
    #[arg(long, default_value = "2s")]
    source_delay: HumanDuration,
    /// HTTP request timeout
    #[arg(long, default_value = "30s")]
    timeout: HumanDuration,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scrape sources and store new articles
    Scrape {
        /// Sources by name or alias (e.g. openai, claude); all when omitted
        sources: Vec<String>,
    },
    /// List available scrapers
    List,
    /// Show stored articles of one source, newest first
    Articles {
        source: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show articles published in the last days
    Recent {
        #[arg(long, default_value_t = 7)]
        days: i64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            request_timeout: self.timeout.0,
            ..ScrapeConfig::default()
        }
        .with_delays(self.article_delay.0, self.source_delay.0)
    }
}

/// Start of the `recent` window, `days` before `now`.
fn recent_since(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    chrono::Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::Validation(format!("--days {} is out of range", days)))
}

fn print_articles(articles: &[StoredArticle]) {
    if articles.is_empty() {
        println!("No articles found");
        return;
    }
    for article in articles {
        println!("{}\n", article.summary());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let storage: Arc<dyn ArticleStorage> =
        ainews_storage::create_storage(&cli.storage, cli.database_url.as_deref()).await?;
    info!("🏦 Storage backend initialized (using {})", cli.storage);

    let config = cli.scrape_config();
    match cli.command {
        Commands::Scrape { sources } => {
            let mut manager = ScraperManager::with_all_scrapers(storage, config)?;
            handle_command(ScraperCommands::Scrape { sources }, &mut manager).await?;
        }
        Commands::List => {
            let mut manager = ScraperManager::with_all_scrapers(storage, config)?;
            handle_command(ScraperCommands::List, &mut manager).await?;
        }
        Commands::Articles { source, limit } => {
            let source = NewsSource::from_str(&source)?;
            print_articles(&storage.get_by_source(source, limit).await?);
        }
        Commands::Recent { days, limit } => {
            let since = recent_since(Utc::now(), days)?;
            print_articles(&storage.get_recent(since, limit).await?);
        }
    }

    Ok(())
}
