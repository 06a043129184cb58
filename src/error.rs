//! Error types for the novel scraper.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong. Per-chapter errors are caught by the
//! pipeline; only [`RunError`] and [`ConfigError`] end a run.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for page fetching.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client itself failed (timeout, connection refused, body read).
    #[error("HTTP request failed: {0}")]
    Client(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// Every attempt failed with a transient error.
    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns true if another attempt might succeed.
    ///
    /// Timeouts, connection errors, 5xx and 429 are transient. Any other
    /// status means the page does not exist or is blocked.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Client(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::RetriesExhausted { .. } => false,
        }
    }
}

/// Error type for chapter index parsing.
#[derive(Error, Debug)]
pub enum IndexError {
    /// No anchor matched the chapter link rules.
    #[error("No chapter links found (selector '{selector}'); check the page structure")]
    NoChapters { selector: String },
}

/// Error type for chapter content extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No content selector or fallback heuristic matched.
    #[error("Could not find chapter text container")]
    ContainerNotFound,

    /// The container held nothing but boilerplate.
    #[error("Chapter text container is empty after cleaning")]
    Empty,
}

/// Error type for translation operations.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// HTTP request to the backend failed
    #[error("Translation request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Backend returned 429
    #[error("Rate limited by translation backend")]
    RateLimited,

    /// Backend returned an error response
    #[error("API error: HTTP {status}: {body}")]
    ApiError { status: StatusCode, body: String },

    /// Failed to parse the backend response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Invalid backend configuration
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),
}

impl TranslationError {
    /// Returns true if retrying the same line might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TranslationError::HttpError(_) | TranslationError::RateLimited => true,
            TranslationError::ApiError { status, .. } => status.is_server_error(),
            TranslationError::ParseError(_) | TranslationError::InvalidConfig(_) => false,
        }
    }
}

/// Error type for writing chapter files.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Output directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Chapter file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Errors that abort a whole run.
#[derive(Error, Debug)]
pub enum RunError {
    /// Output directory could not be created up front
    #[error(transparent)]
    OutputDir(WriteError),

    /// Index page could not be fetched
    #[error("Failed to fetch index page: {0}")]
    IndexFetch(#[source] FetchError),

    /// Index page held no chapter links
    #[error(transparent)]
    Index(#[from] IndexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "https://example.com/1".to_string(),
            status: StatusCode::from_u16(code).unwrap(),
        }
    }

    #[test]
    fn test_fetch_status_classification() {
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(404).is_transient());
        assert!(!status(403).is_transient());
    }

    #[test]
    fn test_exhausted_is_terminal() {
        let err = FetchError::RetriesExhausted {
            url: "https://example.com/1".to_string(),
            attempts: 3,
            last: Box::new(status(500)),
        };
        assert!(!err.is_transient());
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/1"));
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_translation_classification() {
        assert!(TranslationError::RateLimited.is_transient());
        assert!(
            TranslationError::ApiError {
                status: StatusCode::BAD_GATEWAY,
                body: String::new(),
            }
            .is_transient()
        );
        assert!(
            !TranslationError::ApiError {
                status: StatusCode::UNAUTHORIZED,
                body: String::new(),
            }
            .is_transient()
        );
        assert!(!TranslationError::ParseError("bad".to_string()).is_transient());
    }
}
