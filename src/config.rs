//! Configuration management for the novel scraper.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories. Command-line flags are layered on
//! top of the file values to produce a [`RunConfig`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Application name used for config directory.
const APP_NAME: &str = "NovelScraper";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Placeholder value for unconfigured API keys.
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web scraping settings.
    pub scraping: ScrapingConfig,

    /// Translation behavior settings.
    pub translation: TranslationConfig,

    /// OpenAI-compatible API, used when `translation.backend = "openai"`.
    pub api: ApiConfig,

    /// Site-specific extraction rules.
    pub site: SiteConfig,

    /// File paths.
    pub paths: PathsConfig,
}

/// Web scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Delay between chapters in seconds.
    pub request_delay_sec: f64,

    /// Retries after the first attempt, for both fetching and translation.
    pub retries: u32,

    /// Base backoff between fetch attempts in seconds (grows linearly).
    pub retry_delay_sec: f64,

    /// Per-request timeout in seconds.
    pub timeout_sec: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Print every HTTP attempt.
    pub debug: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_delay_sec: 1.0,
            retries: 3,
            retry_delay_sec: 3.0,
            timeout_sec: 15,
            user_agent: "NovelScraper/1.0".to_string(),
            debug: false,
        }
    }
}

/// Which translation service to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Public Google Translate endpoint, no key needed.
    Google,
    /// OpenAI-compatible chat completions API.
    Openai,
}

/// Translation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translate chapters unless `--no-translate` is given.
    pub enabled: bool,

    /// Translation service.
    pub backend: BackendKind,

    /// Source language code.
    pub source_lang: String,

    /// Target language code, also used as the output filename suffix.
    pub target_lang: String,

    /// Pause after every translated line in seconds.
    pub line_delay_sec: f64,

    /// Pause before retrying a failed line in seconds.
    pub retry_delay_sec: f64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: BackendKind::Google,
            source_lang: "zh-TW".to_string(),
            target_lang: "en".to_string(),
            line_delay_sec: 0.5,
            retry_delay_sec: 2.0,
        }
    }
}

/// API configuration for LLM endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key.
    pub key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: API_KEY_PLACEHOLDER.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl ApiConfig {
    /// Checks if the API key is configured (not placeholder).
    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && self.key != API_KEY_PLACEHOLDER
    }
}

/// Site-specific selectors and patterns.
///
/// The defaults match the layout of the site the tool was first written
/// for; other sites need their own values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// CSS selector for chapter links on the index page.
    pub chapter_link_selector: String,

    /// Regex that chapter URLs (after resolution) must match.
    pub chapter_url_pattern: Option<String>,

    /// CSS selectors for the content container, tried in order.
    pub content_selectors: Vec<String>,

    /// CSS selectors for the chapter title, tried in order.
    pub title_selectors: Vec<String>,

    /// Regexes for lines to drop from chapter text.
    pub boilerplate_patterns: Vec<String>,

    /// Minimum direct text for the largest-block fallback to be accepted.
    pub fallback_min_chars: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            chapter_link_selector: "#tbchapterlist a".to_string(),
            chapter_url_pattern: None,
            content_selectors: vec![
                r#"div[style*="font-size: 20px"][style*="line-height: 30px"]"#.to_string(),
                "#content".to_string(),
                "#chaptercontent".to_string(),
                "#novel_content".to_string(),
            ],
            title_selectors: vec!["h1".to_string(), "title".to_string()],
            boilerplate_patterns: vec![
                "請記住本站域名".to_string(),
                "请记住本站域名".to_string(),
                r"^(上一章|下一章|上一頁|下一頁|目錄|目录|返回目錄|返回目录|加入書籤|加入书签)$"
                    .to_string(),
                r"(?i)^(advertisement|previous chapter|next chapter|table of contents)$"
                    .to_string(),
            ],
            fallback_min_chars: 200,
        }
    }
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for chapter files.
    pub output_directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("novel_output"),
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_delay("scraping.request_delay_sec", self.scraping.request_delay_sec)?;
        check_delay("scraping.retry_delay_sec", self.scraping.retry_delay_sec)?;
        check_delay("translation.line_delay_sec", self.translation.line_delay_sec)?;
        check_delay("translation.retry_delay_sec", self.translation.retry_delay_sec)?;

        if self.scraping.timeout_sec == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.timeout_sec".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.translation.enabled
            && self.translation.backend == BackendKind::Openai
            && !self.api.is_configured()
        {
            return Err(ConfigError::MissingValue(
                "api.key (required for the openai translation backend)".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_delay(key: &str, value: f64) -> Result<(), ConfigError> {
    // Rejects NaN, negatives and values too large for a Duration.
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be a non-negative number of seconds".to_string(),
        });
    }
    Ok(())
}

/// Settings for a single run, fixed once the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Chapter index page.
    pub index_url: Url,

    /// Directory for chapter files.
    pub output_dir: PathBuf,

    /// Whether chapters go through the translator.
    pub translate: bool,

    /// Source language code.
    pub source_lang: String,

    /// Target language code.
    pub target_lang: String,

    /// First chapter to process (1-based).
    pub start: u32,

    /// Maximum number of chapters to attempt.
    pub max_chapters: Option<u32>,

    /// Pause after every chapter.
    pub request_delay: Duration,

    /// Retry budget for fetching and translation.
    pub retries: u32,
}

impl RunConfig {
    /// Builds a run configuration from file values, with no overrides.
    ///
    /// `config` must have passed [`Config::validate`].
    pub fn from_config(index_url: Url, config: &Config) -> Self {
        Self {
            index_url,
            output_dir: config.paths.output_directory.clone(),
            translate: config.translation.enabled,
            source_lang: config.translation.source_lang.clone(),
            target_lang: config.translation.target_lang.clone(),
            start: 1,
            max_chapters: None,
            request_delay: Duration::from_secs_f64(config.scraping.request_delay_sec),
            retries: config.scraping.retries,
        }
    }
}
