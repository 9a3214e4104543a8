use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Environment variables
/// fill in anything the file leaves out.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5000
///   max_upload_bytes: 26214400
///
/// media:
///   path: "tts_audio"
///   ttl_seconds: 86400
///   sweep_interval_seconds: 600
///
/// tts:
///   engine: "neural"     # or "offline"
///   delivery: "inline"   # or "url"
///
/// neural:
///   api_key: "your-azure-speech-key"
///   region: "eastus"
///   timeout_seconds: 30
///
/// offline:
///   command: "espeak-ng"
///   rate: 150
///   default_voice: "en"
///
/// transcoder:
///   command: "ffmpeg"
///   timeout_seconds: 60
///
/// stt:
///   enabled: true  # false runs the server without speech-to-text
///   model_path: "/models/ggml-base.bin"
///   language: "en"
///   silence_threshold: 0.01
///
/// translate:
///   endpoint: "https://translate.googleapis.com/translate_a/single"
///   timeout_seconds: 15
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub media: Option<MediaYaml>,
    pub tts: Option<TtsYaml>,
    pub neural: Option<NeuralYaml>,
    pub offline: Option<OfflineYaml>,
    pub transcoder: Option<TranscoderYaml>,
    pub stt: Option<SttYaml>,
    pub translate: Option<TranslateYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MediaYaml {
    pub path: Option<String>,
    pub ttl_seconds: Option<u64>,
    pub sweep_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub engine: Option<String>,
    pub delivery: Option<String>,
}

/// Neural voice service settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NeuralYaml {
    pub api_key: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OfflineYaml {
    pub command: Option<String>,
    pub rate: Option<u32>,
    pub default_voice: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranscoderYaml {
    pub command: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Speech recognition settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SttYaml {
    pub enabled: Option<bool>,
    pub model_path: Option<String>,
    pub language: Option<String>,
    pub silence_threshold: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranslateYaml {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
