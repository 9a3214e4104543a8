//! # Pipeline Orchestrator
//!
//! Per-request coordinator for the two speech flows:
//!
//! - synthesis: `Validating -> VoiceResolved -> Synthesizing -> [Transcoding] -> Stored`
//! - recognition: `Received -> Transcribing -> Done`
//!
//! Every component failure is folded into [`PipelineError`], which the HTTP
//! layer maps onto status codes. Nothing is retried.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::documents::ExtractionError;
use crate::core::media::{AudioFormat, MediaArtifact, MediaStore, MediaStoreError, ScopedArtifact};
use crate::core::stt::{self, RecognitionError, SpeechRecognizer};
use crate::core::transcode::{TranscodeError, Transcoder};
use crate::core::translate::TranslationError;
use crate::core::tts::{SynthesisBackend, SynthesisError};
use crate::core::voices::CatalogError;

/// Request-level failure taxonomy
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or unusable input
    #[error("{0}")]
    Validation(String),

    /// Synthesis, recognition, extraction, translation or subprocess failure
    #[error("{0}")]
    Backend(String),

    /// Unknown media identifier
    #[error("{0}")]
    NotFound(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<SynthesisError> for PipelineError {
    fn from(err: SynthesisError) -> Self {
        if err.is_validation() {
            PipelineError::Validation(err.to_string())
        } else {
            PipelineError::Backend(err.to_string())
        }
    }
}

impl From<CatalogError> for PipelineError {
    fn from(_: CatalogError) -> Self {
        PipelineError::Validation("Invalid language".to_string())
    }
}

impl From<TranscodeError> for PipelineError {
    fn from(err: TranscodeError) -> Self {
        PipelineError::Backend(format!("Audio conversion failed: {err}"))
    }
}

impl From<RecognitionError> for PipelineError {
    fn from(err: RecognitionError) -> Self {
        PipelineError::Backend(err.to_string())
    }
}

impl From<MediaStoreError> for PipelineError {
    fn from(err: MediaStoreError) -> Self {
        match err {
            MediaStoreError::NotFound(name) => PipelineError::NotFound(format!("{name} not found")),
            other => PipelineError::Backend(other.to_string()),
        }
    }
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        PipelineError::Backend(err.to_string())
    }
}

impl From<TranslationError> for PipelineError {
    fn from(err: TranslationError) -> Self {
        PipelineError::Backend(err.to_string())
    }
}

/// Coordinates synthesis, transcoding, storage and recognition.
pub struct SpeechPipeline {
    backend: Arc<dyn SynthesisBackend>,
    transcoder: Transcoder,
    store: Arc<MediaStore>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    silence_threshold: f32,
}

impl SpeechPipeline {
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        transcoder: Transcoder,
        store: Arc<MediaStore>,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        silence_threshold: f32,
    ) -> Self {
        Self {
            backend,
            transcoder,
            store,
            recognizer,
            silence_threshold,
        }
    }

    pub fn backend(&self) -> &Arc<dyn SynthesisBackend> {
        &self.backend
    }

    pub fn store(&self) -> &Arc<MediaStore> {
        &self.store
    }

    pub fn has_recognizer(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Turn `text` into a stored mp3 artifact spoken in `lang`.
    pub async fn synthesize(&self, text: &str, lang: &str) -> PipelineResult<MediaArtifact> {
        debug!(engine = %self.backend.engine(), "synthesis: validating");
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText.into());
        }

        let voice = self.backend.resolve_voice(lang)?;
        debug!(lang, voice = %voice, "synthesis: voice resolved");

        let artifact = self.backend.synthesize(text, &voice).await.map_err(|e| {
            error!("Synthesis failed for voice {}: {}", voice, e);
            PipelineError::from(e)
        })?;
        debug!(file = %artifact.file_name(), "synthesis: audio produced");

        let artifact = if artifact.format == AudioFormat::Mp3 {
            artifact
        } else {
            self.transcode(artifact).await?
        };

        info!(
            "Synthesized {} chars as {} ({} bytes)",
            text.chars().count(),
            artifact.file_name(),
            artifact.size
        );
        Ok(artifact)
    }

    /// Convert an intermediate artifact into mp3; the source is always removed.
    async fn transcode(&self, source: MediaArtifact) -> PipelineResult<MediaArtifact> {
        let source_name = source.file_name();
        debug!(file = %source_name, "synthesis: transcoding");
        let source = ScopedArtifact::new(source);
        let result = self.convert_to_mp3(source.artifact()).await;

        if let Err(e) = source.discard(&self.store).await {
            warn!("Failed to remove intermediate {}: {}", source_name, e);
        }

        result.inspect_err(|e| error!("Transcoding {} failed: {}", source_name, e))
    }

    async fn convert_to_mp3(&self, source: &MediaArtifact) -> PipelineResult<MediaArtifact> {
        let pending = self.store.reserve(AudioFormat::Mp3).await?;
        self.transcoder.convert(&source.path, pending.path()).await?;
        Ok(pending.commit().await?)
    }

    /// Recognize speech in an uploaded audio file.
    ///
    /// No detected speech (empty or silent audio) yields an empty transcript.
    /// The upload is removed once recognition finishes or the request is dropped.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        file_name: Option<&str>,
    ) -> PipelineResult<String> {
        let recognizer = self
            .recognizer
            .clone()
            .ok_or(RecognitionError::NotConfigured)?;

        if audio.is_empty() {
            debug!("recognition: empty upload, nothing to transcribe");
            return Ok(String::new());
        }

        let upload = ScopedArtifact::new(
            self.store
                .put(audio, AudioFormat::from_file_name(file_name))
                .await?,
        );
        let upload_name = upload.artifact().file_name();
        debug!(file = %upload_name, size = upload.artifact().size, "recognition: received");

        let path = upload.artifact().path.clone();
        let threshold = self.silence_threshold;
        debug!(recognizer = recognizer.name(), "recognition: transcribing");
        let result = tokio::task::spawn_blocking(move || {
            let samples = stt::decode_file(&path)?;
            if samples.is_empty() || stt::is_silent(&samples, threshold) {
                debug!("No speech detected in {} samples", samples.len());
                return Ok(String::new());
            }
            recognizer.transcribe(&samples)
        })
        .await;

        if let Err(e) = upload.discard(&self.store).await {
            warn!("Failed to remove upload {}: {}", upload_name, e);
        }

        let text = match result {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                error!("Recognition failed for {}: {}", upload_name, e);
                return Err(e.into());
            }
            Err(e) => {
                error!("Recognition task failed: {}", e);
                return Err(PipelineError::Backend(format!("Recognition task failed: {e}")));
            }
        };

        info!("Transcribed {} into {} chars", upload_name, text.len());
        Ok(text)
    }
}
