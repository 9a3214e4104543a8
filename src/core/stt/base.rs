//! Recognition backend interface.

/// Recognition-specific error types
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    /// The upload could not be decoded as audio
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load recognition model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Speech recognition is not configured")]
    NotConfigured,
}

/// Result type for recognition operations
pub type RecognitionResult<T> = Result<T, RecognitionError>;

/// A loaded speech recognition model.
///
/// The model is loaded once at startup and shared read-only; `transcribe`
/// takes `&self` and must keep any scratch state per call. It is a blocking
/// call and belongs on a blocking worker thread.
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe 16 kHz mono samples in `[-1.0, 1.0]`.
    ///
    /// Returns an empty string when nothing was recognized.
    fn transcribe(&self, samples: &[f32]) -> RecognitionResult<String>;

    /// Short identifier for logs
    fn name(&self) -> &str;
}
