//! Novel scraper - web novel chapter downloader and line-by-line translator.
//!
//! This library provides functionality for:
//! - Discovering chapters on a novel's index page
//! - Extracting story text from chapter pages with configurable rules
//! - Translating text line by line (Google Translate or OpenAI-compatible APIs)
//! - Writing numbered plain-text chapter files

pub mod config;
pub mod console;
pub mod error;
pub mod fetcher;
pub mod pacing;
pub mod pipeline;
pub mod scrapers;
pub mod translator;
pub mod utils;
pub mod writer;

// Re-export commonly used types
pub use config::{Config, RunConfig};
pub use console::Console;
pub use error::{
    ConfigError, ExtractionError, FetchError, IndexError, RunError, TranslationError, WriteError,
};
pub use fetcher::{HttpFetcher, PageFetcher, RetryingFetcher};
pub use pacing::{NoPause, Pacer, RetryPolicy, TokioPacer};
pub use pipeline::{ChapterOutcome, Pipeline, RunSummary};
pub use scrapers::{ChapterContent, ChapterReference, SiteRules};
pub use translator::{TranslationBackend, Translator};
