use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::Delivery;
use crate::core::{AudioFormat, PipelineError};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Request body for the tts endpoint
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Language tag such as `en`, `hi` or `zh-cn`
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AudioUrlResponse {
    /// File name retrievable through `GET /tts_audio/{filename}`
    pub audio_url: String,
}

/// Handler for POST /tts
///
/// Returns the mp3 body directly or `{"audio_url": ...}` depending on the
/// configured delivery mode.
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    request: Result<Json<TtsRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = request?;
    let text = request.text.unwrap_or_default();
    let lang = request.lang.unwrap_or_default();

    info!("TTS request received - lang: {}, text length: {}", lang, text.len());

    let pipeline = &state.core_state.pipeline;
    let artifact = pipeline.synthesize(&text, &lang).await?;
    let file_name = artifact.file_name();

    match state.config.delivery() {
        Delivery::Url => Ok(Json(AudioUrlResponse {
            audio_url: file_name,
        })
        .into_response()),
        Delivery::Inline => {
            let audio = pipeline
                .store()
                .get(&file_name)
                .await
                .map_err(PipelineError::from)?;
            Ok((
                [
                    (header::CONTENT_TYPE, artifact.format.content_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("inline; filename=\"{file_name}\""),
                    ),
                ],
                audio,
            )
                .into_response())
        }
    }
}

/// Handler for GET /tts_audio/{filename}
///
/// Only finished mp3 artifacts are served; uploads and intermediate audio
/// sharing the store answer 404.
pub async fn serve_audio(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    if AudioFormat::from_file_name(Some(filename.as_str())) != AudioFormat::Mp3 {
        return Err(AppError::NotFound(format!("{filename} not found")));
    }

    let audio = state
        .core_state
        .store
        .get(&filename)
        .await
        .map_err(PipelineError::from)?;

    Ok(([(header::CONTENT_TYPE, AudioFormat::Mp3.content_type())], audio).into_response())
}
