pub mod audio;
mod base;
pub mod whisper;

pub use audio::{compute_energy, decode_file, is_silent};
pub use base::{RecognitionError, RecognitionResult, SpeechRecognizer};
#[cfg(feature = "whisper-stt")]
pub use whisper::WhisperRecognizer;

use std::sync::Arc;

use crate::config::SttSettings;

/// Load the recognition model named by the configuration.
///
/// Returns `Ok(None)` only when recognition is switched off with
/// `stt.enabled: false`. Otherwise a missing or unloadable model is an error,
/// so startup aborts instead of serving a degraded endpoint.
pub fn create_recognizer(
    settings: &SttSettings,
) -> RecognitionResult<Option<Arc<dyn SpeechRecognizer>>> {
    if !settings.enabled {
        return Ok(None);
    }

    let Some(model_path) = &settings.model_path else {
        return Err(RecognitionError::ModelLoad(
            "STT_MODEL_PATH is required unless STT_ENABLED=false".to_string(),
        ));
    };

    #[cfg(feature = "whisper-stt")]
    {
        let recognizer = WhisperRecognizer::load(model_path, settings.language.clone())?;
        Ok(Some(Arc::new(recognizer)))
    }

    #[cfg(not(feature = "whisper-stt"))]
    {
        Err(RecognitionError::ModelLoad(format!(
            "cannot load {} without the 'whisper-stt' feature",
            model_path.display()
        )))
    }
}
