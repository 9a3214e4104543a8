//! Static language tag to neural voice mapping.
//!
//! The catalog is the gate for the neural engine: a tag that is not listed here
//! is rejected before any synthesis work begins.

use serde::Serialize;

/// Errors raised by catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown language tag: {0}")]
    NotFound(String),
}

/// A single catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceEntry {
    /// Short language tag such as `en` or `zh-cn`
    pub lang: &'static str,
    /// Neural voice identifier such as `en-US-AriaNeural`
    pub voice: &'static str,
    /// Human readable language name
    pub name: &'static str,
}

const fn entry(lang: &'static str, voice: &'static str, name: &'static str) -> VoiceEntry {
    VoiceEntry { lang, voice, name }
}

const CATALOG: &[VoiceEntry] = &[
    entry("en", "en-US-AriaNeural", "English"),
    entry("hi", "hi-IN-SwaraNeural", "Hindi"),
    entry("mr", "mr-IN-AarohiNeural", "Marathi"),
    entry("kn", "kn-IN-SapnaNeural", "Kannada"),
    entry("ta", "ta-IN-PallaviNeural", "Tamil"),
    entry("te", "te-IN-ShrutiNeural", "Telugu"),
    entry("ml", "ml-IN-SobhanaNeural", "Malayalam"),
    entry("gu", "gu-IN-DhwaniNeural", "Gujarati"),
    entry("bn", "bn-IN-TanishaNeural", "Bengali"),
    entry("pa", "pa-IN-KomalNeural", "Punjabi"),
    entry("ur", "ur-PK-UzmaNeural", "Urdu"),
    entry("fr", "fr-FR-DeniseNeural", "French"),
    entry("es", "es-ES-ElviraNeural", "Spanish"),
    entry("de", "de-DE-KatjaNeural", "German"),
    entry("ar", "ar-AE-FatimaNeural", "Arabic"),
    entry("ja", "ja-JP-NanamiNeural", "Japanese"),
    entry("ko", "ko-KR-SunHiNeural", "Korean"),
    entry("zh-cn", "zh-CN-XiaoxiaoNeural", "Chinese (Simplified)"),
];

/// Resolve a language tag to its neural voice identifier.
///
/// Tags are matched exactly; callers are expected to pass the short lowercase
/// form the HTTP API documents.
pub fn resolve(tag: &str) -> Result<&'static str, CatalogError> {
    CATALOG
        .iter()
        .find(|entry| entry.lang == tag)
        .map(|entry| entry.voice)
        .ok_or_else(|| CatalogError::NotFound(tag.to_string()))
}

/// All catalog rows, in display order
pub fn entries() -> &'static [VoiceEntry] {
    CATALOG
}

/// BCP-47 locale of a neural voice, e.g. `hi-IN` for `hi-IN-SwaraNeural`
pub fn locale_of(voice: &str) -> &str {
    let mut dashes = voice.match_indices('-');
    match (dashes.next(), dashes.next()) {
        (Some(_), Some((second, _))) => &voice[..second],
        _ => voice,
    }
}
