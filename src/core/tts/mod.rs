mod base;
pub mod neural;
pub mod offline;

pub use base::{SynthesisBackend, SynthesisError, SynthesisResult, VoiceInfo};
pub use neural::{NeuralTts, NeuralTtsSettings};
pub use offline::OfflineTts;

use std::sync::Arc;

use crate::config::{ServerConfig, TtsEngine};
use crate::core::media::MediaStore;

/// Factory function to create the configured synthesis backend.
///
/// # Supported Engines
///
/// - `neural` - Azure Speech REST voices, mp3 output (needs a subscription key)
/// - `offline` - local eSpeak-NG, wav output that the pipeline transcodes
///
/// # Example
///
/// ```rust,ignore
/// use sonora::core::tts::create_synthesis_backend;
///
/// let store = Arc::new(MediaStore::open("tts_audio").await?);
/// let backend = create_synthesis_backend(&config, store)?;
/// ```
pub fn create_synthesis_backend(
    config: &ServerConfig,
    store: Arc<MediaStore>,
) -> SynthesisResult<Arc<dyn SynthesisBackend>> {
    match config.tts.engine {
        TtsEngine::Neural => {
            let settings = NeuralTtsSettings::from_config(&config.neural).ok_or_else(|| {
                SynthesisError::InvalidConfiguration(
                    "AZURE_SPEECH_SUBSCRIPTION_KEY is required for the neural engine".to_string(),
                )
            })?;
            Ok(Arc::new(NeuralTts::new(settings, store)?))
        }
        TtsEngine::Offline => Ok(Arc::new(OfflineTts::new(&config.offline, store))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> Arc<MediaStore> {
        Arc::new(MediaStore::open(dir.path()).await.unwrap())
    }

    #[tokio::test]
    async fn test_create_neural_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.neural.api_key = Some("test_subscription_key".to_string());

        let backend = create_synthesis_backend(&config, store(&dir).await).unwrap();
        assert_eq!(backend.engine(), TtsEngine::Neural);
    }

    #[tokio::test]
    async fn test_create_neural_backend_without_key() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig::default();

        match create_synthesis_backend(&config, store(&dir).await) {
            Err(SynthesisError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("AZURE_SPEECH_SUBSCRIPTION_KEY"));
            }
            Err(other) => panic!("Expected InvalidConfiguration error, got: {:?}", other),
            Ok(_) => panic!("Expected error without a subscription key"),
        }
    }

    #[tokio::test]
    async fn test_create_offline_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.tts.engine = TtsEngine::Offline;

        let backend = create_synthesis_backend(&config, store(&dir).await).unwrap();
        assert_eq!(backend.engine(), TtsEngine::Offline);
        // Offline has no catalog gate
        assert!(backend.resolve_voice("xx").is_ok());
    }
}
