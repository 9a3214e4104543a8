use super::ServerConfig;
use super::merge::merge_config;
use super::validation::validate;

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible defaults.
    /// Also loads from .env file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Environment variables are malformed
    /// - The neural engine is selected without a subscription key
    /// - Speech-to-text is enabled without a model, or the model file doesn't exist
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = merge_config(None)?;
        validate(&config)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Delivery, TtsEngine};
    use serial_test::serial;
    use std::env;
    use std::path::PathBuf;

    // Helper to clean up environment variables after tests
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("TTS_ENGINE");
            env::remove_var("TTS_DELIVERY");
            env::remove_var("AZURE_SPEECH_SUBSCRIPTION_KEY");
            env::remove_var("AZURE_SPEECH_REGION");
            env::remove_var("MEDIA_PATH");
            env::remove_var("STT_MODEL_PATH");
            env::remove_var("FFMPEG_COMMAND");
            env::remove_var("STT_ENABLED");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_neural_requires_key() {
        cleanup_env_vars();

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("AZURE_SPEECH_SUBSCRIPTION_KEY")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_neural_with_key() {
        cleanup_env_vars();
        unsafe {
            env::set_var("AZURE_SPEECH_SUBSCRIPTION_KEY", "azure-key");
            env::set_var("AZURE_SPEECH_REGION", "westeurope");
            env::set_var("STT_ENABLED", "false");
        }

        let config = ServerConfig::from_env().expect("Should load config");
        assert_eq!(config.tts.engine, TtsEngine::Neural);
        assert_eq!(config.neural.api_key, Some("azure-key".to_string()));
        assert_eq!(config.neural.region, "westeurope");
        assert_eq!(config.delivery(), Delivery::Inline);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_offline_engine() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_ENGINE", "offline");
            env::set_var("MEDIA_PATH", "/srv/audio");
            env::set_var("FFMPEG_COMMAND", "/opt/ffmpeg/bin/ffmpeg");
            env::set_var("STT_ENABLED", "false");
        }

        let config = ServerConfig::from_env().expect("Should load config");
        assert_eq!(config.tts.engine, TtsEngine::Offline);
        assert_eq!(config.delivery(), Delivery::Url);
        assert_eq!(config.media.path, PathBuf::from("/srv/audio"));
        assert_eq!(
            config.transcoder.command,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_host_and_port() {
        cleanup_env_vars();

        unsafe {
            env::set_var("TTS_ENGINE", "offline");
            env::set_var("HOST", "127.0.0.1");
            env::set_var("PORT", "8080");
            env::set_var("STT_ENABLED", "false");
        }

        let config = ServerConfig::from_env().expect("Should load config");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_ENGINE", "offline");
            env::set_var("PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_model_unless_disabled() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_ENGINE", "offline");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("STT_MODEL_PATH is required"));

        unsafe {
            env::set_var("STT_ENABLED", "false");
        }
        let config = ServerConfig::from_env().expect("Should load config");
        assert!(!config.stt.enabled);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_model_file() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_ENGINE", "offline");
            env::set_var("STT_MODEL_PATH", "/nonexistent/ggml-base.bin");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("STT_MODEL_PATH"));

        cleanup_env_vars();
    }
}
