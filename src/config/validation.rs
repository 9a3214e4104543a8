use super::ServerConfig;
use super::sections::{NeuralConfig, SttSettings, TtsEngine};

/// Run every validation rule against a merged configuration
pub fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_neural(config.tts.engine, &config.neural)?;
    validate_stt(&config.stt)?;

    if config.max_upload_bytes == 0 {
        return Err("MAX_UPLOAD_BYTES must be greater than 0".into());
    }
    if config.transcoder.timeout_seconds == 0 {
        return Err("TRANSCODE_TIMEOUT_SECONDS must be greater than 0".into());
    }
    if config.media.ttl_seconds.is_some() && config.media.sweep_interval_seconds == 0 {
        return Err(
            "MEDIA_SWEEP_INTERVAL_SECONDS must be greater than 0 when retention is enabled".into(),
        );
    }

    Ok(())
}

/// Validate the neural voice service configuration
///
/// The neural engine cannot synthesize anything without a subscription key, so
/// selecting it without one is rejected at startup.
pub fn validate_neural(
    engine: TtsEngine,
    neural: &NeuralConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if engine != TtsEngine::Neural {
        return Ok(());
    }

    if neural.api_key.is_none() {
        return Err(
            "AZURE_SPEECH_SUBSCRIPTION_KEY is required when TTS_ENGINE=neural".into(),
        );
    }

    if neural.endpoint.is_none()
        && (neural.region.is_empty()
            || !neural
                .region
                .chars()
                .all(|c| c.is_ascii_alphanumeric()))
    {
        return Err(format!("Invalid AZURE_SPEECH_REGION: '{}'", neural.region).into());
    }

    Ok(())
}

/// Validate the recognition model location
///
/// Speech-to-text is on by default, so a missing model is a startup error
/// unless it was switched off explicitly.
pub fn validate_stt(stt: &SttSettings) -> Result<(), Box<dyn std::error::Error>> {
    if stt.enabled && stt.model_path.is_none() {
        return Err("STT_MODEL_PATH is required unless STT_ENABLED=false".into());
    }

    if let Some(model_path) = &stt.model_path
        && !model_path.exists()
    {
        return Err(format!(
            "STT_MODEL_PATH file does not exist: {}",
            model_path.display()
        )
        .into());
    }

    if !(0.0..1.0).contains(&stt.silence_threshold) {
        return Err("STT_SILENCE_THRESHOLD must be in the range [0.0, 1.0)".into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn neural_with_key() -> NeuralConfig {
        NeuralConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_neural_missing_key() {
        let result = validate_neural(TtsEngine::Neural, &NeuralConfig::default());
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("AZURE_SPEECH_SUBSCRIPTION_KEY is required")
        );
    }

    #[test]
    fn test_validate_neural_offline_needs_no_key() {
        assert!(validate_neural(TtsEngine::Offline, &NeuralConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_neural_bad_region() {
        let neural = NeuralConfig {
            region: "east us/../".to_string(),
            ..neural_with_key()
        };
        assert!(validate_neural(TtsEngine::Neural, &neural).is_err());
    }

    #[test]
    fn test_validate_neural_endpoint_skips_region_check() {
        let neural = NeuralConfig {
            region: String::new(),
            endpoint: Some("http://localhost:9999/tts".to_string()),
            ..neural_with_key()
        };
        assert!(validate_neural(TtsEngine::Neural, &neural).is_ok());
    }

    #[test]
    fn test_validate_stt_missing_model() {
        let stt = SttSettings {
            model_path: Some(PathBuf::from("/nonexistent/ggml-base.bin")),
            ..Default::default()
        };
        let result = validate_stt(&stt);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_stt_existing_model() {
        let temp_dir = TempDir::new().unwrap();
        let model = temp_dir.path().join("ggml-base.bin");
        fs::write(&model, b"model").unwrap();

        let stt = SttSettings {
            model_path: Some(model),
            ..Default::default()
        };
        assert!(validate_stt(&stt).is_ok());
    }

    #[test]
    fn test_validate_stt_enabled_requires_model() {
        let result = validate_stt(&SttSettings::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("STT_ENABLED=false"));
    }

    #[test]
    fn test_validate_stt_disabled_needs_no_model() {
        let stt = SttSettings {
            enabled: false,
            ..Default::default()
        };
        assert!(validate_stt(&stt).is_ok());
    }

    #[test]
    fn test_validate_stt_threshold_range() {
        let stt = SttSettings {
            enabled: false,
            silence_threshold: 1.5,
            ..Default::default()
        };
        assert!(validate_stt(&stt).is_err());
    }

    #[test]
    fn test_validate_upload_limit() {
        let mut config = ServerConfig::default();
        config.tts.engine = TtsEngine::Offline;
        config.stt.enabled = false;
        assert!(validate(&config).is_ok());

        config.max_upload_bytes = 0;
        assert!(validate(&config).is_err());
    }
}
