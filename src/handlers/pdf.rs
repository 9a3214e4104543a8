use axum::extract::{Multipart, State, multipart::MultipartRejection};
use axum::response::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::core::PipelineError;
use crate::errors::{AppError, AppResult};
use crate::handlers::upload::read_file_field;
use crate::state::AppState;

const NO_TEXT_WARNING: &str = "PDF has no text (maybe scanned)";

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Handler for POST /extract-pdf - multipart field `pdf`
pub async fn extract_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ExtractResponse>> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart, "pdf")
        .await?
        .ok_or_else(|| AppError::BadRequest("No PDF uploaded".to_string()))?;

    let text = state
        .core_state
        .extractor
        .extract_text(upload.data)
        .await
        .map_err(PipelineError::from)?;

    if text.trim().is_empty() {
        info!("PDF {:?} contains no extractable text", upload.file_name);
        return Ok(Json(ExtractResponse {
            text: String::new(),
            warning: Some(NO_TEXT_WARNING.to_string()),
        }));
    }

    info!("Extracted {} chars from PDF {:?}", text.len(), upload.file_name);
    Ok(Json(ExtractResponse {
        text,
        warning: None,
    }))
}
