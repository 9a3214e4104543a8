//! Neural voice service provider.
//!
//! One HTTP POST per synthesis:
//! - URL: `https://{region}.tts.speech.microsoft.com/cognitiveservices/v1`
//! - Authentication: `Ocp-Apim-Subscription-Key` header
//! - Content-Type: `application/ssml+xml`
//! - Output format: `X-Microsoft-OutputFormat` header, always mp3
//!
//! The whole response body is collected before anything touches the Media
//! File Store, so a failed or truncated transfer never leaves a file behind.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use super::config::{
    MP3_OUTPUT_FORMAT, NeuralTtsSettings, OUTPUT_FORMAT_HEADER, SUBSCRIPTION_KEY_HEADER,
    build_ssml,
};
use crate::config::TtsEngine;
use crate::core::media::{AudioFormat, MediaArtifact, MediaStore};
use crate::core::tts::base::{SynthesisBackend, SynthesisError, SynthesisResult, VoiceInfo};
use crate::core::voices;

/// User-Agent header value for synthesis requests.
const USER_AGENT: &str = "sonora-speech-server";

/// Network-backed neural synthesis producing mp3 directly
pub struct NeuralTts {
    client: Client,
    settings: NeuralTtsSettings,
    store: Arc<MediaStore>,
}

impl std::fmt::Debug for NeuralTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralTts")
            .field("endpoint", &self.settings.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NeuralTts {
    pub fn new(settings: NeuralTtsSettings, store: Arc<MediaStore>) -> SynthesisResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                SynthesisError::InvalidConfiguration(format!("Failed to create HTTP client: {e}"))
            })?;

        info!("Neural synthesis endpoint: {}", settings.endpoint);

        Ok(Self {
            client,
            settings,
            store,
        })
    }

    async fn fetch_audio(&self, text: &str, voice: &str) -> SynthesisResult<bytes::Bytes> {
        let ssml = build_ssml(text, voice, voices::locale_of(voice));

        let response = self
            .client
            .post(&self.settings.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.settings.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, MP3_OUTPUT_FORMAT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .body(ssml)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Synthesis API error ({}): {}", status, error_body);
            return Err(SynthesisError::ProviderError(format!(
                "API error ({status}): {error_body}"
            )));
        }

        let audio = response.bytes().await.map_err(map_request_error)?;
        if audio.is_empty() {
            return Err(SynthesisError::AudioGenerationFailed(
                "service returned no audio".to_string(),
            ));
        }

        Ok(audio)
    }
}

fn map_request_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::TimeoutError(format!("Request timed out: {e}"))
    } else {
        SynthesisError::NetworkError(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl SynthesisBackend for NeuralTts {
    fn engine(&self) -> TtsEngine {
        TtsEngine::Neural
    }

    fn resolve_voice(&self, lang: &str) -> SynthesisResult<String> {
        voices::resolve(lang)
            .map(str::to_string)
            .map_err(|_| SynthesisError::InvalidLanguage(lang.to_string()))
    }

    async fn synthesize(&self, text: &str, voice: &str) -> SynthesisResult<MediaArtifact> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let audio = self.fetch_audio(text, voice).await?;
        let artifact = self.store.put(&audio, AudioFormat::Mp3).await?;

        debug!(
            "Neural synthesis stored {} ({} bytes, voice {})",
            artifact.file_name(),
            artifact.size,
            voice
        );
        Ok(artifact)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        voices::entries()
            .iter()
            .map(|entry| VoiceInfo {
                lang: entry.lang.to_string(),
                voice: entry.voice.to_string(),
                name: entry.name.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header, method, path},
    };

    async fn provider(endpoint: String, temp_dir: &TempDir) -> NeuralTts {
        let store = Arc::new(MediaStore::open(temp_dir.path()).await.unwrap());
        NeuralTts::new(
            NeuralTtsSettings {
                api_key: "test-key".to_string(),
                endpoint,
                timeout_seconds: 5,
            },
            store,
        )
        .unwrap()
    }

    fn stored_files(temp_dir: &TempDir) -> usize {
        std::fs::read_dir(temp_dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_synthesize_stores_mp3() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cognitiveservices/v1"))
            .and(header(SUBSCRIPTION_KEY_HEADER, "test-key"))
            .and(header(OUTPUT_FORMAT_HEADER, MP3_OUTPUT_FORMAT))
            .and(header("content-type", "application/ssml+xml"))
            .and(body_string_contains("hi-IN-SwaraNeural"))
            .and(body_string_contains("xml:lang='hi-IN'"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3mp3-bytes".to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let tts = provider(
            format!("{}/cognitiveservices/v1", mock_server.uri()),
            &temp_dir,
        )
        .await;

        let voice = tts.resolve_voice("hi").unwrap();
        let artifact = tts.synthesize("Namaste", &voice).await.unwrap();

        assert_eq!(artifact.format, AudioFormat::Mp3);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"ID3mp3-bytes");
    }

    #[tokio::test]
    async fn test_provider_error_leaves_no_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid key"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let tts = provider(mock_server.uri(), &temp_dir).await;

        let err = tts.synthesize("Hello", "en-US-AriaNeural").await.unwrap_err();
        match err {
            SynthesisError::ProviderError(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Invalid key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stored_files(&temp_dir), 0);
    }

    #[tokio::test]
    async fn test_empty_audio_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let tts = provider(mock_server.uri(), &temp_dir).await;

        let err = tts.synthesize("Hello", "en-US-AriaNeural").await.unwrap_err();
        assert!(matches!(err, SynthesisError::AudioGenerationFailed(_)));
        assert_eq!(stored_files(&temp_dir), 0);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let temp_dir = TempDir::new().unwrap();
        // Nothing listens on port 9 (discard) in test environments
        let tts = provider("http://127.0.0.1:9/tts".to_string(), &temp_dir).await;

        let err = tts.synthesize("Hello", "en-US-AriaNeural").await.unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::NetworkError(_) | SynthesisError::TimeoutError(_)
        ));
        assert_eq!(stored_files(&temp_dir), 0);
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let tts = provider(mock_server.uri(), &temp_dir).await;

        let err = tts.synthesize("   ", "en-US-AriaNeural").await.unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyText));
    }

    #[tokio::test]
    async fn test_resolve_voice_uses_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let tts = provider("http://localhost/unused".to_string(), &temp_dir).await;

        assert_eq!(tts.resolve_voice("ja").unwrap(), "ja-JP-NanamiNeural");
        let err = tts.resolve_voice("xx").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid language");
        assert_eq!(tts.voices().len(), voices::entries().len());
    }
}
