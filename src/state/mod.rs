use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::{CoreState, SpeechRecognizer};

/// Application state that can be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Core layer state: media store, speech pipeline and collaborators
    pub core_state: Arc<CoreState>,
}

impl AppState {
    /// Build the state, loading the recognition model named by the config.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Arc<Self>> {
        let core_state = CoreState::new(&config).await?;
        Ok(Arc::new(Self { config, core_state }))
    }

    /// Build the state around an already loaded recognizer.
    pub async fn with_recognizer(
        config: ServerConfig,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
    ) -> anyhow::Result<Arc<Self>> {
        let core_state = CoreState::with_recognizer(&config, recognizer).await?;
        Ok(Arc::new(Self { config, core_state }))
    }
}
