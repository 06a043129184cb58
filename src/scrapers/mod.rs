//! Rule-driven scraping of chapter indexes and chapter pages.
//!
//! Site layouts differ, so every selector and pattern comes from
//! [`SiteConfig`] and is compiled once into [`SiteRules`].

mod chapter;
mod index;

pub use chapter::extract;
pub use index::parse_index;

use crate::config::SiteConfig;
use crate::error::ConfigError;
use regex::Regex;
use scraper::Selector;

/// A chapter link found on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReference {
    /// Position in the index (1-based).
    pub ordinal: u32,

    /// Link text.
    pub title: String,

    /// Absolute chapter URL.
    pub url: String,
}

/// Cleaned text of one chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    /// Title found on the chapter page (may be empty).
    pub title: String,

    /// Story lines in page order.
    pub paragraphs: Vec<String>,
}

impl ChapterContent {
    /// Joins the paragraphs with newlines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Compiled form of [`SiteConfig`].
#[derive(Debug, Clone)]
pub struct SiteRules {
    /// Source text of the link selector, kept for error messages.
    pub(crate) link_selector_src: String,
    pub(crate) link_selector: Selector,
    pub(crate) any_link: Selector,
    pub(crate) url_pattern: Option<Regex>,
    pub(crate) content_selectors: Vec<Selector>,
    pub(crate) title_selectors: Vec<Selector>,
    pub(crate) fallback_blocks: Selector,
    pub(crate) paragraph: Selector,
    pub(crate) boilerplate: Vec<Regex>,
    pub(crate) fallback_min_chars: usize,
}

impl SiteRules {
    /// Compiles selectors and patterns, reporting the first invalid one.
    pub fn compile(config: &SiteConfig) -> Result<Self, ConfigError> {
        let url_pattern = config
            .chapter_url_pattern
            .as_deref()
            .map(|p| parse_regex("site.chapter_url_pattern", p))
            .transpose()?;

        Ok(Self {
            link_selector_src: config.chapter_link_selector.clone(),
            link_selector: parse_selector(
                "site.chapter_link_selector",
                &config.chapter_link_selector,
            )?,
            any_link: parse_selector("a", "a[href]")?,
            url_pattern,
            content_selectors: config
                .content_selectors
                .iter()
                .map(|s| parse_selector("site.content_selectors", s))
                .collect::<Result<_, _>>()?,
            title_selectors: config
                .title_selectors
                .iter()
                .map(|s| parse_selector("site.title_selectors", s))
                .collect::<Result<_, _>>()?,
            fallback_blocks: parse_selector("fallback", "div, article, section")?,
            paragraph: parse_selector("paragraph", "p")?,
            boilerplate: config
                .boilerplate_patterns
                .iter()
                .map(|p| parse_regex("site.boilerplate_patterns", p))
                .collect::<Result<_, _>>()?,
            fallback_min_chars: config.fallback_min_chars,
        })
    }

    /// Returns true if the line should be dropped from chapter text.
    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.iter().any(|re| re.is_match(line))
    }
}

impl Default for SiteRules {
    fn default() -> Self {
        // The built-in selectors and patterns are known to parse.
        Self::compile(&SiteConfig::default()).expect("default site rules must compile")
    }
}

fn parse_selector(key: &str, source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("invalid CSS selector '{}': {}", source, e),
    })
}

fn parse_regex(key: &str, source: &str) -> Result<Regex, ConfigError> {
    Regex::new(source).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
