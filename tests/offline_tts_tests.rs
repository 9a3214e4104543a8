#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt;

use sonora::config::TtsEngine;
use sonora::{ServerConfig, routes, state::AppState};

// Stand-in for espeak-ng: writes a tiny "wav" to the -w target
const FAKE_ESPEAK: &str = r#"out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -w) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf 'RIFF' > "$out"
cat >> "$out""#;

// Stand-in for ffmpeg: the last argument is the destination
const FAKE_FFMPEG: &str = r#"for last; do :; done
printf 'ID3 transcoded' > "$last""#;

const BROKEN_FFMPEG: &str = r#"echo 'Encoder libmp3lame not found' >&2
exit 1"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

async fn offline_app(dir: &TempDir, ffmpeg_body: &str) -> Router {
    let mut config = ServerConfig::default();
    config.tts.engine = TtsEngine::Offline;
    config.media.path = dir.path().join("tts_audio");
    config.offline.command = write_script(dir.path(), "espeak-ng", FAKE_ESPEAK);
    config.transcoder.command = write_script(dir.path(), "ffmpeg", ffmpeg_body);
    config.stt.enabled = false;

    let max_upload_bytes = config.max_upload_bytes;
    let app_state = AppState::new(config).await.unwrap();
    routes::api::create_api_router(max_upload_bytes).with_state(app_state)
}

fn tts_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/tts")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn media_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path().join("tts_audio"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[tokio::test]
async fn test_offline_tts_returns_audio_url() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir, FAKE_FFMPEG).await;

    let response = app
        .clone()
        .oneshot(tts_request(json!({"text": "Bonjour tout le monde", "lang": "fr"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let audio_url = json["audio_url"].as_str().unwrap().to_string();
    assert!(audio_url.ends_with(".mp3"));

    // The intermediate wav is gone, only the mp3 remains
    assert_eq!(media_files(&dir), vec![audio_url.clone()]);

    let request = Request::builder()
        .uri(format!("/tts_audio/{audio_url}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body_bytes(response).await, b"ID3 transcoded");
}

#[tokio::test]
async fn test_offline_tts_unknown_language_uses_default_voice() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir, FAKE_FFMPEG).await;

    let response = app
        .oneshot(tts_request(json!({"text": "Hello", "lang": "xx"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_offline_tts_transcoder_failure() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir, BROKEN_FFMPEG).await;

    let response = app
        .oneshot(tts_request(json!({"text": "Hallo Welt", "lang": "de"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json.get("audio_url").is_none());
    assert!(json["error"].as_str().unwrap().contains("libmp3lame"));
    assert!(media_files(&dir).is_empty());
}
