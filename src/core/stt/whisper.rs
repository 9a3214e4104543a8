//! Local Whisper recognition through whisper.cpp bindings.
//!
//! The context (model weights) is loaded once and shared behind an `Arc`;
//! each call creates its own inference state, so concurrent transcriptions
//! never touch shared mutable data.

#![cfg(feature = "whisper-stt")]

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::base::{RecognitionError, RecognitionResult, SpeechRecognizer};

pub struct WhisperRecognizer {
    ctx: Arc<WhisperContext>,
    language: Option<String>,
}

impl WhisperRecognizer {
    /// Load a GGML model file.
    ///
    /// `language` of `None` lets the model detect the spoken language.
    pub fn load(model_path: &Path, language: Option<String>) -> RecognitionResult<Self> {
        if !model_path.exists() {
            return Err(RecognitionError::ModelLoad(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let path = model_path.to_str().ok_or_else(|| {
            RecognitionError::ModelLoad(format!("Invalid model path: {}", model_path.display()))
        })?;

        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| RecognitionError::ModelLoad(format!("{e:?}")))?;

        info!("Whisper model loaded from {}", model_path.display());

        Ok(Self {
            ctx: Arc::new(ctx),
            language,
        })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, samples: &[f32]) -> RecognitionResult<String> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| RecognitionError::Inference(format!("Failed to create state: {e:?}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(self.language.as_deref().unwrap_or("auto")));

        // Leave one core for the async runtime
        let num_threads = std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1).max(1))
            .unwrap_or(4);
        params.set_n_threads(num_threads as i32);
        params.set_translate(false);
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| RecognitionError::Inference(format!("{e:?}")))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| RecognitionError::Inference(format!("{e:?}")))?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| RecognitionError::Inference(format!("{e:?}")))?;
            let segment = segment.trim();
            if !segment.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(segment);
            }
        }

        debug!("Whisper produced {} segments", num_segments);
        Ok(text)
    }

    fn name(&self) -> &str {
        "whisper"
    }
}
