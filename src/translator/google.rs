//! Google Translate web endpoint backend.

use super::TranslationBackend;
use crate::error::TranslationError;
use crate::utils::check_response_status;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Public endpoint used by the translate web widgets.
const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Translates through the keyless Google Translate endpoint.
pub struct GoogleBackend {
    client: Client,
}

impl GoogleBackend {
    /// Creates a backend with its own HTTP client.
    pub fn new() -> Result<Self, TranslationError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client })
    }

    fn request_url(
        line: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Url, TranslationError> {
        Url::parse_with_params(
            ENDPOINT,
            &[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", line),
            ],
        )
        .map_err(|e| TranslationError::InvalidConfig(e.to_string()))
    }
}

/// Joins the translated segments of a `translate_a/single` response.
///
/// The body is a nested array; its first element lists
/// `[translated, original, ...]` segments.
fn parse_response(body: &str) -> Result<String, TranslationError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| TranslationError::ParseError(e.to_string()))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::ParseError("missing segment list".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    Ok(text)
}

#[async_trait]
impl TranslationBackend for GoogleBackend {
    fn name(&self) -> &'static str {
        "Google Translate"
    }

    async fn translate_line(
        &self,
        line: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let url = Self::request_url(line, source_lang, target_lang)?;
        let response = self.client.get(url).send().await?;
        let response = check_response_status(response).await?;
        let body = response.text().await?;
        parse_response(&body)
    }
}
