//! Machine translation collaborator.
//!
//! Uses the public Google endpoint (`client=gtx`) with automatic source
//! language detection. The response is a nested JSON array whose first
//! element holds `[translated, original, ...]` sentence chunks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::config::TranslateConfig;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Translation service error: {0}")]
    Provider(String),

    #[error("Unexpected translation response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type TranslationResult<T> = Result<T, TranslationError>;

/// Translates text from an auto-detected language into `target_lang`
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> TranslationResult<String>;
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> TranslationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                TranslationError::InvalidConfiguration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Translation API error ({}): {}", status, body);
            return Err(TranslationError::Provider(format!("({status}): {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        parse_translation(&body)
    }
}

/// Concatenate the translated chunks of a `translate_a/single` response
fn parse_translation(body: &Value) -> TranslationResult<String> {
    let chunks = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Parse("missing sentence list".to_string()))?;

    Ok(chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn translator(server: &MockServer) -> GoogleTranslator {
        GoogleTranslator::new(&TranslateConfig {
            endpoint: format!("{}/translate_a/single", server.uri()),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_translate_concatenates_chunks() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "fr"))
            .and(query_param("q", "Hello. How are you?"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                [
                    ["Bonjour. ", "Hello. ", null, null, 10],
                    ["Comment allez-vous?", "How are you?", null, null, 10]
                ],
                null,
                "en"
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translated = translator(&mock_server)
            .translate("Hello. How are you?", "fr")
            .await
            .unwrap();
        assert_eq!(translated, "Bonjour. Comment allez-vous?");
    }

    #[tokio::test]
    async fn test_translate_service_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&mock_server)
            .await;

        let err = translator(&mock_server)
            .translate("Hello", "de")
            .await
            .unwrap_err();
        match err {
            TranslationError::Provider(msg) => assert!(msg.contains("429")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_translate_unexpected_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&mock_server)
            .await;

        let err = translator(&mock_server)
            .translate("Hello", "de")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::Parse(_)));
    }

    #[test]
    fn test_parse_translation_skips_non_text_chunks() {
        let body = json!([[["Hola", "Hello"], [null, null, "Ola"]], null, "en"]);
        assert_eq!(parse_translation(&body).unwrap(), "Hola");
    }
}
