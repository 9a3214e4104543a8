use bytes::Bytes;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Attempts at finding an unused identifier before giving up.
const MAX_ID_ATTEMPTS: usize = 4;

/// Marker between identifier and extension for in-progress files.
const PARTIAL_MARKER: &str = "part";

/// Errors that can occur during media store operations.
#[derive(Error, Debug)]
pub enum MediaStoreError {
    /// The requested artifact does not exist or the name is not a store name.
    #[error("Media not found: {0}")]
    NotFound(String),

    /// I/O error occurred during filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer finished without producing any bytes.
    #[error("Artifact is empty: {0}")]
    Empty(String),

    #[error("Could not allocate a unique media identifier")]
    IdExhausted,
}

/// Result type for media store operations.
pub type MediaStoreResult<T> = Result<T, MediaStoreError>;

/// Random 128-bit artifact identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(Uuid);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Container format of a stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    /// Uploaded audio in some other container; holds the sanitized extension
    Other(String),
}

impl AudioFormat {
    /// Derive a format from a file extension, sanitizing unknown ones.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim().to_ascii_lowercase();
        match ext.as_str() {
            "wav" | "wave" => AudioFormat::Wav,
            "mp3" => AudioFormat::Mp3,
            other
                if !other.is_empty()
                    && other.len() <= 5
                    && other.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                AudioFormat::Other(other.to_string())
            }
            _ => AudioFormat::Other("bin".to_string()),
        }
    }

    /// Derive a format from an uploaded file name such as `memo.ogg`.
    pub fn from_file_name(name: Option<&str>) -> Self {
        let ext = name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Other(ext) => ext,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Other(ext) => match ext.as_str() {
                "ogg" | "oga" | "opus" => "audio/ogg",
                "webm" => "audio/webm",
                "flac" => "audio/flac",
                "m4a" | "mp4" | "aac" => "audio/mp4",
                _ => "application/octet-stream",
            },
        }
    }
}

/// An immutable, stored audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    pub id: MediaId,
    pub format: AudioFormat,
    pub path: PathBuf,
    pub size: u64,
}

impl MediaArtifact {
    /// Public name of the artifact, `<uuid>.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.format.extension())
    }
}

/// Filesystem-backed artifact store.
///
/// Writes never overwrite another artifact: every `put` or `reserve` allocates
/// a fresh identifier and only renames into place once the content is
/// complete.
#[derive(Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> MediaStoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!("Media store opened at {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn final_path(&self, id: &MediaId, format: &AudioFormat) -> PathBuf {
        self.root.join(format!("{id}.{}", format.extension()))
    }

    // The extension stays last so external tools still infer the container.
    fn partial_path(&self, id: &MediaId, format: &AudioFormat) -> PathBuf {
        self.root
            .join(format!(".{id}.{PARTIAL_MARKER}.{}", format.extension()))
    }

    /// Store `bytes` as a new artifact.
    pub async fn put(&self, bytes: &[u8], format: AudioFormat) -> MediaStoreResult<MediaArtifact> {
        if bytes.is_empty() {
            return Err(MediaStoreError::Empty(format.extension().to_string()));
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = MediaId::new();
            let final_path = self.final_path(&id, &format);
            let temp_path = self.partial_path(&id, &format);

            // Atomic write using temp file
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            let written = write_and_sync(&mut file, bytes).await;
            drop(file);

            if let Err(e) = written {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }

            if fs::try_exists(&final_path).await? {
                let _ = fs::remove_file(&temp_path).await;
                continue;
            }
            fs::rename(&temp_path, &final_path).await?;

            debug!("Stored {} bytes as {:?}", bytes.len(), final_path);
            return Ok(MediaArtifact {
                id,
                format,
                path: final_path,
                size: bytes.len() as u64,
            });
        }

        Err(MediaStoreError::IdExhausted)
    }

    /// Reserve a location for an external writer.
    ///
    /// The returned guard exposes a temporary path; the artifact becomes
    /// visible only after [`PendingArtifact::commit`]. Dropping the guard
    /// without committing removes whatever was written.
    pub async fn reserve(&self, format: AudioFormat) -> MediaStoreResult<PendingArtifact> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = MediaId::new();
            let final_path = self.final_path(&id, &format);
            let temp_path = self.partial_path(&id, &format);

            if fs::try_exists(&final_path).await? || fs::try_exists(&temp_path).await? {
                continue;
            }

            return Ok(PendingArtifact {
                id,
                format,
                temp_path,
                final_path,
                committed: false,
            });
        }

        Err(MediaStoreError::IdExhausted)
    }

    /// Resolve a public file name to an existing artifact.
    pub async fn lookup(&self, file_name: &str) -> MediaStoreResult<MediaArtifact> {
        let (id, format) = parse_file_name(file_name)
            .ok_or_else(|| MediaStoreError::NotFound(file_name.to_string()))?;
        let path = self.final_path(&id, &format);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(MediaArtifact {
                id,
                format,
                path,
                size: meta.len(),
            }),
            Ok(_) => Err(MediaStoreError::NotFound(file_name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(MediaStoreError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read an artifact's bytes by its public file name.
    pub async fn get(&self, file_name: &str) -> MediaStoreResult<Bytes> {
        let artifact = self.lookup(file_name).await?;
        match fs::read(&artifact.path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(MediaStoreError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an artifact. Missing files are not an error.
    pub async fn remove(&self, artifact: &MediaArtifact) -> MediaStoreResult<()> {
        match fs::remove_file(&artifact.path).await {
            Ok(()) => {
                debug!("Removed media artifact {}", artifact.file_name());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every file older than `max_age`, including abandoned partials.
    ///
    /// Returns the number of files removed.
    pub async fn sweep_expired(&self, max_age: Duration) -> MediaStoreResult<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                _ => continue,
            };
            let age = meta
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();

            if age > max_age {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => warn!("Failed to sweep {:?}: {}", entry.path(), e),
                }
            }
        }

        Ok(removed)
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval` until the
    /// task is aborted.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        max_age: Duration,
        interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match self.sweep_expired(max_age).await {
                    Ok(0) => {}
                    Ok(count) => info!("Swept {} expired media files", count),
                    Err(e) => warn!("Media sweep failed: {}", e),
                }
            }
        })
    }
}

async fn write_and_sync(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Parse `<uuid>.<ext>` into its parts. Anything else is rejected, which also
/// rules out path separators and parent references.
fn parse_file_name(name: &str) -> Option<(MediaId, AudioFormat)> {
    let (stem, ext) = name.split_once('.')?;
    let uuid = Uuid::parse_str(stem).ok()?;
    if stem != uuid.hyphenated().to_string() {
        return None;
    }
    let format = AudioFormat::from_extension(ext);
    if format.extension() != ext {
        return None;
    }
    Some((MediaId(uuid), format))
}

/// A reserved, not yet visible artifact location.
#[derive(Debug)]
pub struct PendingArtifact {
    id: MediaId,
    format: AudioFormat,
    temp_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl PendingArtifact {
    /// Path an external writer should produce its output at
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Publish the written file as an artifact.
    ///
    /// Fails with [`MediaStoreError::Empty`] when nothing (or zero bytes) was
    /// written; the partial file is cleaned up either way.
    pub async fn commit(mut self) -> MediaStoreResult<MediaArtifact> {
        let size = match fs::metadata(&self.temp_path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if size == 0 {
            return Err(MediaStoreError::Empty(self.id.to_string()));
        }

        fs::rename(&self.temp_path, &self.final_path).await?;
        self.committed = true;

        Ok(MediaArtifact {
            id: self.id,
            format: self.format.clone(),
            path: self.final_path.clone(),
            size,
        })
    }
}

impl Drop for PendingArtifact {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}

/// A stored artifact owned by a single request.
///
/// The file is deleted by [`ScopedArtifact::discard`], or when the guard is
/// dropped, so a cancelled request does not leave it behind.
#[derive(Debug)]
pub struct ScopedArtifact {
    artifact: MediaArtifact,
    discarded: bool,
}

impl ScopedArtifact {
    pub fn new(artifact: MediaArtifact) -> Self {
        Self {
            artifact,
            discarded: false,
        }
    }

    pub fn artifact(&self) -> &MediaArtifact {
        &self.artifact
    }

    /// Delete the artifact from `store`.
    pub async fn discard(mut self, store: &MediaStore) -> MediaStoreResult<()> {
        self.discarded = true;
        store.remove(&self.artifact).await
    }
}

impl Drop for ScopedArtifact {
    fn drop(&mut self) {
        if self.discarded {
            return;
        }
        match std::fs::remove_file(&self.artifact.path) {
            Ok(()) => debug!("Removed abandoned artifact {}", self.artifact.file_name()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", self.artifact.file_name(), e),
        }
    }
}
