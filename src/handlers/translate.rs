use axum::extract::{State, rejection::JsonRejection};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::core::PipelineError;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Request body for the translate endpoint
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Target language code, e.g. `hi` or `fr`
    #[serde(default)]
    pub target_lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated: String,
}

/// Handler for POST /translate
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    request: Result<Json<TranslateRequest>, JsonRejection>,
) -> AppResult<Json<TranslateResponse>> {
    let Json(request) = request?;

    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No text provided".to_string()))?;
    let target = request
        .target_lang
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("No target language provided".to_string()))?;

    let translated = state
        .core_state
        .translator
        .translate(&text, &target)
        .await
        .map_err(PipelineError::from)?;

    info!("Translated {} chars into {}", text.len(), target);
    Ok(Json(TranslateResponse { translated }))
}
