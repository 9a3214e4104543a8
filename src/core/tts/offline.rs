//! Offline synthesis through a local eSpeak-NG process.
//!
//! # Thread Safety
//!
//! The engine is not guaranteed to be re-entrant, so every invocation goes
//! through a single async mutex: one synthesis in flight per process.
//! Waiting requests suspend on the lock instead of occupying a worker.
//!
//! # System Requirements
//!
//! eSpeak-NG must be installed on the system:
//! - Ubuntu/Debian: `sudo apt-get install espeak-ng`
//! - macOS: `brew install espeak-ng`

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::config::{OfflineConfig, TtsEngine};
use crate::core::media::{AudioFormat, MediaArtifact, MediaStore};
use crate::core::tts::base::{SynthesisBackend, SynthesisError, SynthesisResult, VoiceInfo};

/// Upper bound on a single engine run.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(120);

/// Language tag to eSpeak-NG voice name.
const ESPEAK_VOICES: &[(&str, &str, &str)] = &[
    ("en", "en-us", "English"),
    ("hi", "hi", "Hindi"),
    ("mr", "mr", "Marathi"),
    ("kn", "kn", "Kannada"),
    ("ta", "ta", "Tamil"),
    ("te", "te", "Telugu"),
    ("ml", "ml", "Malayalam"),
    ("gu", "gu", "Gujarati"),
    ("bn", "bn", "Bengali"),
    ("pa", "pa", "Punjabi"),
    ("ur", "ur", "Urdu"),
    ("fr", "fr-fr", "French"),
    ("es", "es", "Spanish"),
    ("de", "de", "German"),
    ("ar", "ar", "Arabic"),
    ("ja", "ja", "Japanese"),
    ("ko", "ko", "Korean"),
    ("zh-cn", "cmn", "Chinese (Mandarin)"),
];

/// Handle to the eSpeak-NG binary
#[derive(Debug)]
struct EspeakEngine {
    command: PathBuf,
    rate: u32,
}

impl EspeakEngine {
    /// Run one synthesis, writing a wav file to `output`.
    async fn render(&self, text: &str, voice: &str, output: &Path) -> SynthesisResult<()> {
        let mut child = Command::new(&self.command)
            .arg("-v")
            .arg(voice)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-w")
            .arg(output)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SynthesisError::AudioGenerationFailed(format!(
                    "Failed to start {}: {e}",
                    self.command.display()
                ))
            })?;

        // Text goes through stdin so it can never be read as an option
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(text.as_bytes()).await
        {
            // An engine that exits early is reported through its exit status
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(SynthesisError::AudioGenerationFailed(format!(
                    "Failed to send text: {e}"
                )));
            }
        }

        let output = match tokio::time::timeout(SYNTHESIS_TIMEOUT, child.wait_with_output()).await
        {
            Ok(result) => result.map_err(|e| {
                SynthesisError::AudioGenerationFailed(format!("Engine I/O failed: {e}"))
            })?,
            Err(_) => {
                return Err(SynthesisError::TimeoutError(format!(
                    "Offline engine exceeded {SYNTHESIS_TIMEOUT:?}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Offline engine failed ({}): {}", output.status, stderr.trim());
            return Err(SynthesisError::AudioGenerationFailed(format!(
                "Engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Local synthesis producing wav artifacts that still need transcoding
pub struct OfflineTts {
    engine: Mutex<EspeakEngine>,
    default_voice: String,
    store: Arc<MediaStore>,
}

impl OfflineTts {
    pub fn new(config: &OfflineConfig, store: Arc<MediaStore>) -> Self {
        Self {
            engine: Mutex::new(EspeakEngine {
                command: config.command.clone(),
                rate: config.rate,
            }),
            default_voice: config.default_voice.clone(),
            store,
        }
    }
}

#[async_trait]
impl SynthesisBackend for OfflineTts {
    fn engine(&self) -> TtsEngine {
        TtsEngine::Offline
    }

    fn resolve_voice(&self, lang: &str) -> SynthesisResult<String> {
        let voice = ESPEAK_VOICES
            .iter()
            .find(|(tag, _, _)| *tag == lang)
            .map(|(_, voice, _)| voice.to_string())
            .unwrap_or_else(|| {
                debug!(
                    "No offline voice for '{}', using default '{}'",
                    lang, self.default_voice
                );
                self.default_voice.clone()
            });
        Ok(voice)
    }

    async fn synthesize(&self, text: &str, voice: &str) -> SynthesisResult<MediaArtifact> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let pending = self.store.reserve(AudioFormat::Wav).await?;
        {
            let engine = self.engine.lock().await;
            engine.render(text, voice, pending.path()).await?;
        }

        let artifact = pending.commit().await.map_err(|e| {
            SynthesisError::AudioGenerationFailed(format!("Engine produced no audio: {e}"))
        })?;

        debug!(
            "Offline synthesis stored {} ({} bytes, voice {})",
            artifact.file_name(),
            artifact.size,
            voice
        );
        Ok(artifact)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        ESPEAK_VOICES
            .iter()
            .map(|(lang, voice, name)| VoiceInfo {
                lang: lang.to_string(),
                voice: voice.to_string(),
                name: name.to_string(),
            })
            .collect()
    }
}
