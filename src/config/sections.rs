use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default Media File Store root, relative to the working directory.
pub const DEFAULT_MEDIA_PATH: &str = "tts_audio";

/// Default public translation endpoint.
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Synthesis engine variant, chosen once per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtsEngine {
    /// Network-backed neural voices producing mp3 directly
    #[default]
    Neural,
    /// Local engine producing wav that is transcoded to mp3
    Offline,
}

impl TtsEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsEngine::Neural => "neural",
            TtsEngine::Offline => "offline",
        }
    }
}

impl fmt::Display for TtsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neural" | "online" | "edge" | "azure" => Ok(TtsEngine::Neural),
            "offline" | "local" | "espeak" => Ok(TtsEngine::Offline),
            other => Err(format!(
                "Invalid TTS engine '{other}'. Must be 'neural' or 'offline'"
            )),
        }
    }
}

/// How `/tts` hands the finished artifact back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stream the mp3 bytes in the response body
    Inline,
    /// Respond with `{"audio_url": "<file>"}` for retrieval via `/tts_audio`
    Url,
}

impl Delivery {
    pub fn default_for(engine: TtsEngine) -> Self {
        match engine {
            TtsEngine::Neural => Delivery::Inline,
            TtsEngine::Offline => Delivery::Url,
        }
    }
}

impl FromStr for Delivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" | "binary" => Ok(Delivery::Inline),
            "url" => Ok(Delivery::Url),
            other => Err(format!(
                "Invalid TTS delivery '{other}'. Must be 'inline' or 'url'"
            )),
        }
    }
}

/// Media File Store settings
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub path: PathBuf,
    /// Artifacts older than this are swept; `None` keeps them forever
    pub ttl_seconds: Option<u64>,
    pub sweep_interval_seconds: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MEDIA_PATH),
            ttl_seconds: Some(24 * 60 * 60),
            sweep_interval_seconds: 600,
        }
    }
}

impl MediaConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TtsSettings {
    pub engine: TtsEngine,
    /// Explicit delivery mode; `None` means the engine's default
    pub delivery: Option<Delivery>,
}

/// Neural voice service (Azure Speech REST) settings
#[derive(Debug, Clone)]
pub struct NeuralConfig {
    pub api_key: Option<String>,
    pub region: String,
    /// Full synthesis URL; derived from `region` when unset
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: "eastus".to_string(),
            endpoint: None,
            timeout_seconds: 30,
        }
    }
}

/// Local synthesis engine settings
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    pub command: PathBuf,
    /// Speaking rate in words per minute
    pub rate: u32,
    pub default_voice: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("espeak-ng"),
            rate: 150,
            default_voice: "en".to_string(),
        }
    }
}

/// External encoder settings
#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    pub command: PathBuf,
    pub timeout_seconds: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("ffmpeg"),
            timeout_seconds: 60,
        }
    }
}

/// Speech recognition settings
#[derive(Debug, Clone)]
pub struct SttSettings {
    /// Serve `/speech-to-text`; a model is mandatory while this is on
    pub enabled: bool,
    /// Model file loaded once at startup
    pub model_path: Option<PathBuf>,
    /// Language hint, `None` for auto-detection
    pub language: Option<String>,
    /// RMS energy below which audio is treated as containing no speech
    pub silence_threshold: f32,
}

impl Default for SttSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: None,
            language: None,
            silence_threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            timeout_seconds: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_str() {
        assert_eq!("neural".parse::<TtsEngine>(), Ok(TtsEngine::Neural));
        assert_eq!("Offline".parse::<TtsEngine>(), Ok(TtsEngine::Offline));
        assert_eq!(" espeak ".parse::<TtsEngine>(), Ok(TtsEngine::Offline));
        assert!("pyttsx".parse::<TtsEngine>().is_err());
    }

    #[test]
    fn test_delivery_from_str() {
        assert_eq!("inline".parse::<Delivery>(), Ok(Delivery::Inline));
        assert_eq!("URL".parse::<Delivery>(), Ok(Delivery::Url));
        assert!("stream".parse::<Delivery>().is_err());
    }

    #[test]
    fn test_media_ttl() {
        let mut media = MediaConfig::default();
        assert_eq!(media.ttl(), Some(Duration::from_secs(86_400)));
        media.ttl_seconds = None;
        assert_eq!(media.ttl(), None);
    }
}
