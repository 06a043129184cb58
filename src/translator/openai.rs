//! OpenAI-compatible chat completions backend.

use super::TranslationBackend;
use crate::config::ApiConfig;
use crate::error::TranslationError;
use crate::utils::check_response_status;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for the chat completions API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

/// A message in the conversation.
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Response from the chat completions API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// A single choice in the response.
#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Message content in a response.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Translates through an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiBackend {
    client: Client,
    api_config: ApiConfig,
}

impl OpenAiBackend {
    /// Creates a backend for the given API settings.
    pub fn new(api_config: ApiConfig) -> Result<Self, TranslationError> {
        if !api_config.is_configured() {
            return Err(TranslationError::InvalidConfig(
                "api.key is not set".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { client, api_config })
    }

    fn build_request(&self, line: &str, source_lang: &str, target_lang: &str) -> ChatRequest {
        ChatRequest {
            model: self.api_config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt(source_lang, target_lang),
                },
                Message {
                    role: "user".to_string(),
                    content: line.to_string(),
                },
            ],
        }
    }
}

fn system_prompt(source_lang: &str, target_lang: &str) -> String {
    format!(
        "You translate web novel text from language code '{}' to language code '{}'. \
         Translate the single line you are given. Reply with the translation only, \
         without notes, quotes or explanations.",
        source_lang, target_lang
    )
}

/// Extracts the first choice's content from a response body.
fn parse_response(body: &str) -> Result<String, TranslationError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| TranslationError::ParseError(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| TranslationError::ParseError("response has no content".to_string()))
}

#[async_trait]
impl TranslationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "OpenAI-compatible API"
    }

    async fn translate_line(
        &self,
        line: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let request = self.build_request(line, source_lang, target_lang);
        let url = format!(
            "{}/chat/completions",
            self.api_config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_config.key))
            .json(&request)
            .send()
            .await?;

        let response = check_response_status(response).await?;
        let body = response.text().await?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ApiConfig {
        ApiConfig {
            key: "sk-test".to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_requires_key() {
        assert!(OpenAiBackend::new(ApiConfig::default()).is_err());
        assert!(OpenAiBackend::new(configured()).is_ok());
    }

    #[test]
    fn test_request_shape() {
        let backend = OpenAiBackend::new(configured()).unwrap();
        let request = backend.build_request("天色漸暗。", "zh-TW", "en");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(
            json["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("'zh-TW'")
        );
        assert_eq!(json["messages"][1]["content"], "天色漸暗。");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  The sky darkened.\n"}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "The sky darkened.");
    }

    #[test]
    fn test_parse_empty_choices() {
        assert!(parse_response(r#"{"choices":[]}"#).is_err());
        assert!(parse_response("not json").is_err());
    }
}
