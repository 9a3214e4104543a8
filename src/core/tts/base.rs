//! # Synthesis Backend Trait
//!
//! This module provides the capability interface shared by the synthesis
//! engines. Exactly one engine is selected per deployment; callers only see
//! `SynthesisBackend`.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sonora::core::tts::{SynthesisBackend, create_synthesis_backend};
//!
//! async fn example(config: &ServerConfig, store: Arc<MediaStore>) -> SynthesisResult<()> {
//!     let backend = create_synthesis_backend(config, store)?;
//!
//!     // Language tag to engine-specific voice
//!     let voice = backend.resolve_voice("hi")?;
//!
//!     // Stored artifact: mp3 for the neural engine, wav for the offline one
//!     let artifact = backend.synthesize("Namaste", &voice).await?;
//!     println!("{} ({} bytes)", artifact.file_name(), artifact.size);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;

use crate::config::TtsEngine;
use crate::core::media::{MediaArtifact, MediaStoreError};

/// Synthesis-specific error types
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Invalid language")]
    InvalidLanguage(String),

    #[error("No text provided")]
    EmptyText,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Audio generation failed: {0}")]
    AudioGenerationFailed(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] MediaStoreError),
}

impl SynthesisError {
    /// Whether the caller sent something unusable, as opposed to a backend fault
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SynthesisError::InvalidLanguage(_) | SynthesisError::EmptyText
        )
    }
}

/// Result type for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// A voice an engine can speak with, as listed by `GET /voices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInfo {
    pub lang: String,
    pub voice: String,
    pub name: String,
}

/// Common interface for the synthesis engines
///
/// Implementations own their engine handle and a reference to the Media File
/// Store. They are shared across requests behind an `Arc`, so any state that
/// is not re-entrant must be serialized internally.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Which engine variant this is
    fn engine(&self) -> TtsEngine;

    /// Map a language tag to this engine's voice identifier.
    ///
    /// The neural engine rejects tags outside its catalog with
    /// [`SynthesisError::InvalidLanguage`]; the offline engine falls back to
    /// its default voice instead.
    fn resolve_voice(&self, lang: &str) -> SynthesisResult<String>;

    /// Synthesize `text` with `voice` and store the result.
    ///
    /// On failure no artifact is left behind in the store.
    async fn synthesize(&self, text: &str, voice: &str) -> SynthesisResult<MediaArtifact>;

    /// Voices this engine supports
    fn voices(&self) -> Vec<VoiceInfo>;
}
