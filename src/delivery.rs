// SPDX-License-Identifier: MPL-2.0

//! Getting a finished capture off the machine, or at least onto disk
//!
//! Used by the one-shot commands: a capture is either written locally or
//! uploaded, and a recording whose upload fails is written to the videos
//! folder so it is not lost.

use crate::errors::ServerError;
use crate::storage;
use crate::upload::{MediaFile, MediaKind, UploadClient, UploadResponse};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Write `file` locally
///
/// `output` may name a directory (a timestamped name is picked inside it) or
/// an exact file path. Without `output` the file goes to `default_dir`.
pub async fn save_to(
    kind: MediaKind,
    file: &MediaFile,
    output: Option<&Path>,
    default_dir: &Path,
) -> std::io::Result<PathBuf> {
    match output {
        Some(path) if path.is_dir() => storage::save_media(kind, file, path).await,
        Some(path) => storage::save_media_as(file, path).await,
        None => storage::save_media(kind, file, default_dir).await,
    }
}

/// A rejected upload, with where the recording was kept if it was a video
#[derive(Debug)]
pub struct UploadFailure {
    pub error: ServerError,
    /// `None` for photos; for videos, the local copy or why it could not be written
    pub kept: Option<Result<PathBuf, String>>,
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kept {
            Some(Ok(path)) => write!(f, "{} (recording kept at {})", self.error, path.display()),
            _ => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for UploadFailure {}

/// Upload `file`; a video that cannot be uploaded is written into `keep_dir`
pub async fn upload_or_keep(
    client: &UploadClient,
    kind: MediaKind,
    file: MediaFile,
    keep_dir: &Path,
) -> Result<UploadResponse, UploadFailure> {
    let kept_copy = (kind == MediaKind::Video).then(|| file.clone());
    let error = match client.upload(kind, file).await {
        Ok(response) => return Ok(response),
        Err(e) => e,
    };
    error!(kind = ?kind, error = %error, "Upload failed");

    let kept = match kept_copy {
        Some(file) => Some(
            storage::save_media(kind, &file, keep_dir)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Could not keep recording");
                    e.to_string()
                }),
        ),
        None => None,
    };
    Err(UploadFailure { error, kept })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> MediaFile {
        MediaFile::new(vec![0xFF, 0xD8, 0xFF], "photo.jpg", "image/jpeg")
    }

    #[tokio::test]
    async fn test_save_to_default_dir() {
        let default_dir = tempfile::tempdir().unwrap();
        let path = save_to(MediaKind::Photo, &photo(), None, default_dir.path())
            .await
            .unwrap();
        assert_eq!(path.parent(), Some(default_dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("IMG_"));
    }

    #[tokio::test]
    async fn test_save_to_output_directory() {
        let default_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let path = save_to(
            MediaKind::Photo,
            &photo(),
            Some(output.path()),
            default_dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(path.parent(), Some(output.path()));
        assert_eq!(path.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read_dir(default_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_save_to_output_file() {
        let default_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let target = output.path().join("shots").join("me.jpg");
        let path = save_to(MediaKind::Photo, &photo(), Some(&target), default_dir.path())
            .await
            .unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), photo().bytes);
    }
}
