use std::env;
use std::path::PathBuf;

use super::ServerConfig;
use super::sections::{
    Delivery, MediaConfig, NeuralConfig, OfflineConfig, SttSettings, TranscoderConfig,
    TranslateConfig, TtsEngine, TtsSettings,
};
use super::utils::{non_empty, parse_env_var};
use super::yaml::YamlConfig;

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// # Arguments
/// * `yaml_config` - Optional YAML configuration to use as overrides
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();
    let defaults = ServerConfig::default();

    // Helper macro for string values: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            non_empty($yaml_value).or_else(|| non_empty(env::var($env_var).ok()))
        };
    }

    // Helper macro for parsed values: YAML > ENV > Default
    macro_rules! get_parsed {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            match $yaml_value {
                Some(value) => value,
                None => parse_env_var($env_var)?.unwrap_or($default),
            }
        };
    }

    // Server configuration
    let server = yaml.server.unwrap_or_default();
    let host = get_optional!("HOST", server.host).unwrap_or(defaults.host);
    let port = get_parsed!("PORT", server.port, defaults.port);
    let max_upload_bytes = get_parsed!(
        "MAX_UPLOAD_BYTES",
        server.max_upload_bytes,
        defaults.max_upload_bytes
    );

    // Media File Store
    let media_yaml = yaml.media.unwrap_or_default();
    let media_defaults = MediaConfig::default();
    let ttl_seconds = match media_yaml.ttl_seconds {
        Some(value) => value,
        None => parse_env_var("MEDIA_TTL_SECONDS")?
            .unwrap_or(media_defaults.ttl_seconds.unwrap_or(0)),
    };
    let media = MediaConfig {
        path: get_optional!("MEDIA_PATH", media_yaml.path)
            .map(PathBuf::from)
            .unwrap_or(media_defaults.path),
        // Zero disables the sweep
        ttl_seconds: (ttl_seconds > 0).then_some(ttl_seconds),
        sweep_interval_seconds: get_parsed!(
            "MEDIA_SWEEP_INTERVAL_SECONDS",
            media_yaml.sweep_interval_seconds,
            media_defaults.sweep_interval_seconds
        ),
    };

    // Engine selection
    let tts_yaml = yaml.tts.unwrap_or_default();
    let engine = match get_optional!("TTS_ENGINE", tts_yaml.engine) {
        Some(raw) => raw.parse::<TtsEngine>()?,
        None => TtsEngine::default(),
    };
    let delivery = get_optional!("TTS_DELIVERY", tts_yaml.delivery)
        .map(|raw| raw.parse::<Delivery>())
        .transpose()?;
    let tts = TtsSettings { engine, delivery };

    // Neural voice service
    let neural_yaml = yaml.neural.unwrap_or_default();
    let neural_defaults = NeuralConfig::default();
    let neural = NeuralConfig {
        api_key: get_optional!("AZURE_SPEECH_SUBSCRIPTION_KEY", neural_yaml.api_key),
        region: get_optional!("AZURE_SPEECH_REGION", neural_yaml.region)
            .unwrap_or(neural_defaults.region),
        endpoint: get_optional!("NEURAL_TTS_ENDPOINT", neural_yaml.endpoint),
        timeout_seconds: get_parsed!(
            "NEURAL_TTS_TIMEOUT_SECONDS",
            neural_yaml.timeout_seconds,
            neural_defaults.timeout_seconds
        ),
    };

    // Offline engine
    let offline_yaml = yaml.offline.unwrap_or_default();
    let offline_defaults = OfflineConfig::default();
    let offline = OfflineConfig {
        command: get_optional!("OFFLINE_TTS_COMMAND", offline_yaml.command)
            .map(PathBuf::from)
            .unwrap_or(offline_defaults.command),
        rate: get_parsed!("OFFLINE_TTS_RATE", offline_yaml.rate, offline_defaults.rate),
        default_voice: get_optional!("OFFLINE_TTS_DEFAULT_VOICE", offline_yaml.default_voice)
            .unwrap_or(offline_defaults.default_voice),
    };

    // Transcoder
    let transcoder_yaml = yaml.transcoder.unwrap_or_default();
    let transcoder_defaults = TranscoderConfig::default();
    let transcoder = TranscoderConfig {
        command: get_optional!("FFMPEG_COMMAND", transcoder_yaml.command)
            .map(PathBuf::from)
            .unwrap_or(transcoder_defaults.command),
        timeout_seconds: get_parsed!(
            "TRANSCODE_TIMEOUT_SECONDS",
            transcoder_yaml.timeout_seconds,
            transcoder_defaults.timeout_seconds
        ),
    };

    // Recognition
    let stt_yaml = yaml.stt.unwrap_or_default();
    let stt_defaults = SttSettings::default();
    let stt = SttSettings {
        enabled: get_parsed!("STT_ENABLED", stt_yaml.enabled, stt_defaults.enabled),
        model_path: get_optional!("STT_MODEL_PATH", stt_yaml.model_path).map(PathBuf::from),
        language: get_optional!("STT_LANGUAGE", stt_yaml.language)
            .filter(|lang| !lang.eq_ignore_ascii_case("auto")),
        silence_threshold: get_parsed!(
            "STT_SILENCE_THRESHOLD",
            stt_yaml.silence_threshold,
            stt_defaults.silence_threshold
        ),
    };

    // Translation
    let translate_yaml = yaml.translate.unwrap_or_default();
    let translate_defaults = TranslateConfig::default();
    let translate = TranslateConfig {
        endpoint: get_optional!("TRANSLATE_ENDPOINT", translate_yaml.endpoint)
            .unwrap_or(translate_defaults.endpoint),
        timeout_seconds: get_parsed!(
            "TRANSLATE_TIMEOUT_SECONDS",
            translate_yaml.timeout_seconds,
            translate_defaults.timeout_seconds
        ),
    };

    Ok(ServerConfig {
        host,
        port,
        max_upload_bytes,
        media,
        tts,
        neural,
        offline,
        transcoder,
        stt,
        translate,
    })
}
