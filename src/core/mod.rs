pub mod documents;
pub mod media;
pub mod pipeline;
pub mod state;
pub mod stt;
pub mod transcode;
pub mod translate;
pub mod tts;
pub mod voices;

// Re-export commonly used types for convenience
pub use documents::{ExtractionError, PdfTextExtractor, TextExtractor};
pub use media::{AudioFormat, MediaArtifact, MediaStore, MediaStoreError};
pub use pipeline::{PipelineError, PipelineResult, SpeechPipeline};
pub use stt::{RecognitionError, SpeechRecognizer, create_recognizer};
pub use transcode::{TranscodeError, Transcoder};
pub use translate::{GoogleTranslator, TranslationError, Translator};
pub use tts::{SynthesisBackend, SynthesisError, VoiceInfo, create_synthesis_backend};
pub use voices::CatalogError;

// Re-export CoreState for external use
pub use state::CoreState;
