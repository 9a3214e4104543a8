//! wav to mp3 conversion through an external encoder process.
//!
//! The encoder is spawned per call with piped stdout/stderr and
//! `kill_on_drop`, so a timed out or abandoned request never leaves an
//! orphaned process behind.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::config::TranscoderConfig;

/// Errors raised while converting audio
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to start encoder '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Encoder timed out after {0:?}")]
    Timeout(Duration),

    #[error("Source audio missing: {0}")]
    MissingSource(PathBuf),
}

/// Invokes the configured encoder binary (ffmpeg by default).
#[derive(Debug, Clone)]
pub struct Transcoder {
    command: PathBuf,
    timeout: Duration,
}

impl Transcoder {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    fn build_command(&self, src: &Path, dst: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-y")
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(src)
            .args(["-vn", "-codec:a", "libmp3lame", "-q:a", "4"])
            .arg(dst)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Convert `src` (wav) into `dst` (mp3), replacing `dst` if it exists.
    pub async fn convert(&self, src: &Path, dst: &Path) -> Result<(), TranscodeError> {
        if !tokio::fs::try_exists(src).await.unwrap_or(false) {
            return Err(TranscodeError::MissingSource(src.to_path_buf()));
        }

        debug!("Transcoding {:?} -> {:?}", src, dst);
        let mut cmd = self.build_command(src, dst);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(TranscodeError::Spawn {
                    command: self.command.display().to_string(),
                    source,
                });
            }
            Err(_) => {
                error!("Encoder timed out after {:?} converting {:?}", self.timeout, src);
                return Err(TranscodeError::Timeout(self.timeout));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            warn!("Encoder failed ({}): {}", output.status, stderr);
            return Err(TranscodeError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            debug!("Encoder diagnostics: {}", stderr);
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn transcoder(command: PathBuf, timeout_seconds: u64) -> Transcoder {
        Transcoder::new(&TranscoderConfig {
            command,
            timeout_seconds,
        })
    }

    const COPY_SCRIPT: &str = r#"in=""; out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    *) out="$1"; shift ;;
  esac
done
cp "$in" "$out""#;

    #[tokio::test]
    async fn test_convert_success_overwrites_destination() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), "fake-ffmpeg", COPY_SCRIPT);
        let src = temp_dir.path().join("in.wav");
        let dst = temp_dir.path().join("out.mp3");
        std::fs::write(&src, b"RIFF-audio").unwrap();
        std::fs::write(&dst, b"stale content that is longer").unwrap();

        transcoder(script, 10).convert(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"RIFF-audio");
    }

    #[tokio::test]
    async fn test_convert_failure_carries_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(
            temp_dir.path(),
            "broken-ffmpeg",
            "echo 'Invalid data found when processing input' >&2\nexit 1",
        );
        let src = temp_dir.path().join("in.wav");
        std::fs::write(&src, b"garbage").unwrap();

        let err = transcoder(script, 10)
            .convert(&src, &temp_dir.path().join("out.mp3"))
            .await
            .unwrap_err();

        match err {
            TranscodeError::Failed { stderr, .. } => {
                assert!(stderr.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_convert_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), "slow-ffmpeg", "exec sleep 5");
        let src = temp_dir.path().join("in.wav");
        std::fs::write(&src, b"RIFF").unwrap();

        let err = transcoder(script, 1)
            .convert(&src, &temp_dir.path().join("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_convert_missing_binary() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("in.wav");
        std::fs::write(&src, b"RIFF").unwrap();

        let err = transcoder(temp_dir.path().join("no-such-ffmpeg"), 10)
            .convert(&src, &temp_dir.path().join("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_convert_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let err = transcoder(PathBuf::from("ffmpeg"), 10)
            .convert(
                &temp_dir.path().join("absent.wav"),
                &temp_dir.path().join("out.mp3"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::MissingSource(_)));
    }
}
