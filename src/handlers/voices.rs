use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::core::VoiceInfo;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    /// Active synthesis engine
    pub engine: &'static str,
    pub voices: Vec<VoiceInfo>,
}

/// Handler for GET /voices - the language to voice table of the active engine
pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    let backend = state.core_state.pipeline.backend();
    Json(VoicesResponse {
        engine: backend.engine().as_str(),
        voices: backend.voices(),
    })
}
