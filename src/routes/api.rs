use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{api, pdf, stt, translate, tts, voices};
use crate::state::AppState;
use std::sync::Arc;

/// Build the HTTP surface.
///
/// `max_upload_bytes` caps multipart bodies for `/extract-pdf` and
/// `/speech-to-text`.
pub fn create_api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/voices", get(voices::list_voices))
        .route("/tts", post(tts::synthesize))
        .route("/tts_audio/{filename}", get(tts::serve_audio))
        .route("/translate", post(translate::translate_text))
        .route(
            "/extract-pdf",
            post(pdf::extract_pdf).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/speech-to-text",
            post(stt::speech_to_text).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
