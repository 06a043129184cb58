//! novel-scraper CLI - download web novel chapters and translate them.

use anyhow::{Context, Result};
use clap::Parser;
use novel_scraper::config::{Config, RunConfig};
use novel_scraper::console::Console;
use novel_scraper::fetcher::{HttpFetcher, RetryingFetcher};
use novel_scraper::pacing::{Pacer, RetryPolicy, TokioPacer};
use novel_scraper::pipeline::Pipeline;
use novel_scraper::scrapers::SiteRules;
use novel_scraper::translator::{Translator, create_backend};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Scrape novel chapters from an index page and optionally translate them.
#[derive(Parser, Debug)]
#[command(name = "novel-scraper")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Index page URL that lists all chapters.
    index_url: String,

    /// Directory where output .txt files will be stored.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Disable translation and save only the original text.
    #[arg(long)]
    no_translate: bool,

    /// Maximum number of chapters to process.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_chapters: Option<u32>,

    /// Start from chapter N (1-based).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    start: Option<u32>,

    /// Seconds to wait between chapters.
    #[arg(long, value_parser = parse_seconds)]
    request_delay: Option<f64>,

    /// Retries for HTTP requests and translated lines.
    #[arg(long)]
    retries: Option<u32>,

    /// Source language code for translation.
    #[arg(long)]
    src_lang: Option<String>,

    /// Target language code for translation.
    #[arg(long)]
    dest_lang: Option<String>,

    /// Timeout in seconds for HTTP requests.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Custom User-Agent header.
    #[arg(long)]
    user_agent: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    Duration::try_from_secs_f64(seconds)
        .map(|_| seconds)
        .map_err(|_| "must be a non-negative number of seconds".to_string())
}

impl Args {
    /// Layers command-line flags over the file configuration.
    fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.paths.output_directory = dir.clone();
        }
        if self.no_translate {
            config.translation.enabled = false;
        }
        if let Some(delay) = self.request_delay {
            config.scraping.request_delay_sec = delay;
        }
        if let Some(retries) = self.retries {
            config.scraping.retries = retries;
        }
        if let Some(lang) = &self.src_lang {
            config.translation.source_lang = lang.clone();
        }
        if let Some(lang) = &self.dest_lang {
            config.translation.target_lang = lang.clone();
        }
        if let Some(timeout) = self.timeout {
            config.scraping.timeout_sec = timeout;
        }
        if let Some(ua) = &self.user_agent {
            config.scraping.user_agent = ua.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    console.section("Novel Scraper");

    console.step("Loading configuration...");
    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    let rules = SiteRules::compile(&config.site).context("Invalid site rules")?;

    let index_url = Url::parse(&args.index_url)
        .with_context(|| format!("Invalid index URL: {}", args.index_url))?;

    let mut run = RunConfig::from_config(index_url, &config);
    run.start = args.start.unwrap_or(1);
    run.max_chapters = args.max_chapters;
    console.success("Configuration loaded");
    console.info(&format!("Output directory: {}", run.output_dir.display()));

    let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);
    let fetcher = RetryingFetcher::new(
        HttpFetcher::new(&config.scraping).context("Failed to create HTTP client")?,
        RetryPolicy::linear(
            run.retries,
            Duration::from_secs_f64(config.scraping.retry_delay_sec),
        ),
        pacer.clone(),
    );

    let translator = if run.translate {
        let backend = create_backend(&config.translation, &config.api)
            .context("Failed to set up translation backend")?;
        console.info(&format!(
            "Translating {} → {} with {}",
            run.source_lang,
            run.target_lang,
            backend.name()
        ));
        Some(Translator::new(
            backend,
            run.source_lang.clone(),
            run.target_lang.clone(),
            run.retries,
            &config.translation,
            pacer.clone(),
        ))
    } else {
        console.info("Translation disabled");
        None
    };

    let mut pipeline = Pipeline::new(&run, &rules, &fetcher, pacer.as_ref());
    if let Some(translator) = &translator {
        pipeline = pipeline.with_translator(translator);
    }

    let summary = pipeline.run().await.context("Run aborted")?;

    if summary.failed > 0 || summary.skipped > 0 {
        console.warning("Some chapters were not saved; see the messages above");
    }
    console.section("Done!");
    Ok(())
}
