//! Utility functions for common operations.

use crate::error::TranslationError;
use reqwest::StatusCode;

/// Checks if an HTTP response is successful, and if not, returns a detailed error.
///
/// This helper extracts both the status code and response body for better error messages.
/// A 429 becomes [`TranslationError::RateLimited`] so callers can retry it.
///
/// # Arguments
/// * `response` - The reqwest Response to check
///
/// # Returns
/// Ok(response) if successful, or Err(TranslationError) with details if not
pub async fn check_response_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, TranslationError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranslationError::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TranslationError::ApiError {
            status,
            body: truncate_chars(body.trim(), 200),
        });
    }
    Ok(response)
}

/// Returns at most `max` characters of `text`, marking the cut with `...`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}
