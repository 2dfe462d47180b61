use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Local;
use nanoid::nanoid;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::config::ALLOWED_EXTENSIONS;
use crate::error::Result;

/// Attempts at finding a free name before giving up with the last I/O error.
const MAX_NAME_ATTEMPTS: usize = 4;

const FALLBACK_FILENAME: &str = "upload";

const WINDOWS_DEVICE_FILES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// An image received in a multipart form, not yet on disk.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Whether `filename` carries one of the accepted image extensions.
///
/// The extension is whatever follows the last `.`; comparison ignores case.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client-supplied filename to a flat, ASCII-only name that is safe
/// to join onto the staging directory.
///
/// Accented characters are folded to ASCII (NFKD, combining marks dropped),
/// path separators become spaces, whitespace runs collapse to `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are
/// trimmed, so `../../etc/passwd` becomes `etc_passwd`. Windows device names
/// get a `_` prefix. An empty result falls back to `upload`.
pub fn secure_filename(filename: &str) -> String {
    let folded: String = filename.nfkd().filter(char::is_ascii).collect();
    let flattened = folded.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let stem = trimmed.split('.').next().unwrap_or_default().to_uppercase();
    if WINDOWS_DEVICE_FILES.contains(&stem.as_str()) {
        return format!("_{trimmed}");
    }

    trimmed.to_string()
}

/// The staging directory shared (read-only) by all requests.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Create the staging directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an upload under `<YYYYMMDD_HHMMSS>_<sanitized name>`.
    ///
    /// Returns `Ok(None)` when the filename is missing or its extension is not
    /// accepted; nothing is written in that case. I/O failures are errors.
    pub async fn stage(&self, upload: &UploadedImage) -> Result<Option<PathBuf>> {
        if upload.file_name.is_empty() || !allowed_file(&upload.file_name) {
            debug!(file_name = %upload.file_name, "Rejected upload with unsupported extension");
            return Ok(None);
        }

        let name = secure_filename(&upload.file_name);
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let mut candidate = self.dir.join(format!("{timestamp}_{name}"));
        let mut attempt = 0;
        loop {
            attempt += 1;
            match write_new(&candidate, &upload.bytes).await {
                Ok(()) => {
                    debug!(path = %candidate.display(), bytes = upload.bytes.len(), "Staged upload");
                    return Ok(Some(candidate));
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    warn!(path = %candidate.display(), "Staging name taken, adding discriminator");
                    candidate = self
                        .dir
                        .join(format!("{timestamp}_{}_{name}", nanoid!(8)));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        // Nobody tracks this path yet, so a partial file must not survive.
        let _ = tokio::fs::remove_file(path).await;
        return Err(e);
    }

    Ok(())
}
