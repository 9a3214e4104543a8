//! Configuration module for the Sonora server
//!
//! This module handles server configuration from two sources: YAML files and
//! environment variables. When both provide a value the YAML file wins, and
//! anything left unset falls back to a built-in default.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `sections`: Typed settings for each pipeline component
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use sonora::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallbacks
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod sections;
mod utils;
mod validation;
mod yaml;

pub use sections::{
    Delivery, MediaConfig, NeuralConfig, OfflineConfig, SttSettings, TranscoderConfig,
    TranslateConfig, TtsEngine, TtsSettings,
};

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default multipart upload limit (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration
///
/// Contains everything needed to run the server:
/// - Server settings (host, port, upload limit)
/// - Media File Store location and retention
/// - Synthesis engine selection and per-engine settings
/// - Transcoder, recognition and translation settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,

    pub media: MediaConfig,
    pub tts: TtsSettings,
    pub neural: NeuralConfig,
    pub offline: OfflineConfig,
    pub transcoder: TranscoderConfig,
    pub stt: SttSettings,
    pub translate: TranslateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            media: MediaConfig::default(),
            tts: TtsSettings::default(),
            neural: NeuralConfig::default(),
            offline: OfflineConfig::default(),
            transcoder: TranscoderConfig::default(),
            stt: SttSettings::default(),
            translate: TranslateConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable fallbacks
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables
    /// 3. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;

        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Delivery mode for synthesized audio, resolving the engine default.
    pub fn delivery(&self) -> Delivery {
        self.tts
            .delivery
            .unwrap_or_else(|| Delivery::default_for(self.tts.engine))
    }
}
