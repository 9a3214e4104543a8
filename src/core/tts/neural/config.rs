//! Request settings and SSML generation for the neural voice service.

use crate::config::NeuralConfig;

/// HTTP header name for the subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// HTTP header name for the requested output format.
pub const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";

/// Output format requested from the service; already the delivery format.
pub const MP3_OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// Resolved settings for the neural provider
#[derive(Debug, Clone)]
pub struct NeuralTtsSettings {
    pub api_key: String,
    /// Full synthesis URL
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl NeuralTtsSettings {
    /// Build settings from server configuration.
    ///
    /// Returns `None` when no subscription key is configured.
    pub fn from_config(config: &NeuralConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| regional_endpoint(&config.region));

        Some(Self {
            api_key,
            endpoint,
            timeout_seconds: config.timeout_seconds,
        })
    }
}

/// Regional synthesis endpoint:
/// `https://{region}.tts.speech.microsoft.com/cognitiveservices/v1`
pub fn regional_endpoint(region: &str) -> String {
    format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1")
}

/// Escapes special XML characters in text for use in SSML.
///
/// # Example
///
/// ```rust
/// use sonora::core::tts::neural::escape_xml;
///
/// assert_eq!(escape_xml("Tom & Jerry"), "Tom &amp; Jerry");
/// ```
pub fn escape_xml(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Wrap `text` in an SSML document for `voice_name` speaking `locale`.
pub fn build_ssml(text: &str, voice_name: &str, locale: &str) -> String {
    let escaped_text = escape_xml(text);
    let voice_name = escape_xml(voice_name);
    let locale = escape_xml(locale);

    format!(
        r#"<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{locale}'>
    <voice name='{voice_name}'>
        {escaped_text}
    </voice>
</speak>"#,
    )
}
