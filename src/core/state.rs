use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::documents::{PdfTextExtractor, TextExtractor};
use crate::core::media::MediaStore;
use crate::core::pipeline::SpeechPipeline;
use crate::core::stt::{SpeechRecognizer, create_recognizer};
use crate::core::transcode::Transcoder;
use crate::core::translate::{GoogleTranslator, Translator};
use crate::core::tts::create_synthesis_backend;

/// Core-specific shared state for the application.
///
/// Holds the process-wide handles created once at startup: the Media File
/// Store, the speech pipeline (synthesis backend, encoder and recognition
/// model) and the document/translation collaborators.
#[derive(Clone)]
pub struct CoreState {
    /// Generated and uploaded audio
    pub store: Arc<MediaStore>,
    /// Synthesis and recognition orchestration
    pub pipeline: Arc<SpeechPipeline>,
    /// PDF text extraction
    pub extractor: Arc<dyn TextExtractor>,
    /// Machine translation
    pub translator: Arc<dyn Translator>,
}

impl CoreState {
    /// Initialize core state, loading the recognition model unless speech-to-text
    /// is disabled.
    ///
    /// Any failure here is fatal; the server must not start half-configured.
    pub async fn new(config: &ServerConfig) -> anyhow::Result<Arc<Self>> {
        let recognizer =
            create_recognizer(&config.stt).context("Failed to load speech recognition model")?;
        if recognizer.is_none() {
            info!("Speech-to-text disabled by configuration");
        }
        Self::with_recognizer(config, recognizer).await
    }

    /// Initialize core state around an already loaded recognizer.
    pub async fn with_recognizer(
        config: &ServerConfig,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
    ) -> anyhow::Result<Arc<Self>> {
        let store = Arc::new(
            MediaStore::open(&config.media.path)
                .await
                .with_context(|| format!("Failed to open media store at {:?}", config.media.path))?,
        );

        let backend = create_synthesis_backend(config, store.clone())
            .context("Failed to create synthesis backend")?;
        info!("Synthesis engine: {}", backend.engine());

        let pipeline = Arc::new(SpeechPipeline::new(
            backend,
            Transcoder::new(&config.transcoder),
            store.clone(),
            recognizer,
            config.stt.silence_threshold,
        ));

        let translator: Arc<dyn Translator> = Arc::new(
            GoogleTranslator::new(&config.translate).context("Failed to create translator")?,
        );

        Ok(Arc::new(Self {
            store,
            pipeline,
            extractor: Arc::new(PdfTextExtractor),
            translator,
        }))
    }
}
