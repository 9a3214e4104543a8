use axum::extract::{Multipart, State, multipart::MultipartRejection};
use axum::response::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::handlers::upload::read_file_field;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub text: String,
}

/// Handler for POST /speech-to-text - multipart field `audio`
///
/// Responds with an empty `text` when no speech is detected.
pub async fn speech_to_text(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<TranscriptResponse>> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart, "audio")
        .await?
        .ok_or_else(|| AppError::BadRequest("No audio uploaded".to_string()))?;

    let text = state
        .core_state
        .pipeline
        .transcribe(&upload.data, upload.file_name.as_deref())
        .await?;

    Ok(Json(TranscriptResponse { text }))
}
