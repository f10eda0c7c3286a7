// SPDX-License-Identifier: MPL-2.0

//! Local storage for photos and videos that are saved rather than uploaded

use crate::upload::{MediaFile, MediaKind};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default photo directory (`~/Pictures/<folder>`)
pub fn photo_dir(folder: &str) -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folder)
}

/// Default video directory (`~/Videos/<folder>`)
pub fn video_dir(folder: &str) -> PathBuf {
    dirs::video_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folder)
}

/// Directory for a kind of media
pub fn media_dir(kind: MediaKind, folder: &str) -> PathBuf {
    match kind {
        MediaKind::Photo => photo_dir(folder),
        MediaKind::Video => video_dir(folder),
    }
}

/// Timestamped file name, e.g. `IMG_20240101_120000.jpg`
pub fn timestamped_name(kind: MediaKind, extension: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    match kind {
        MediaKind::Photo => format!("IMG_{}.{}", timestamp, extension),
        MediaKind::Video => format!("video_{}.{}", timestamp, extension),
    }
}

/// First path in `dir` based on `name` that does not exist yet
///
/// Two captures in the same second would otherwise share a name:
/// `IMG_x.jpg`, `IMG_x_1.jpg`, `IMG_x_2.jpg`, ...
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{}_{}.{}", stem, n, ext)),
            None => dir.join(format!("{}_{}", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Write `file` into `dir` under a timestamped name
pub async fn save_media(kind: MediaKind, file: &MediaFile, dir: &Path) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let extension = file.extension().unwrap_or("bin");
    let path = unique_path(dir, &timestamped_name(kind, extension));
    tokio::fs::write(&path, &file.bytes).await?;

    info!(path = %path.display(), bytes = file.bytes.len(), "Media saved");
    Ok(path)
}

/// Write `file` to an exact path, creating parent directories
pub async fn save_media_as(file: &MediaFile, path: &Path) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &file.bytes).await?;
    info!(path = %path.display(), bytes = file.bytes.len(), "Media saved");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_names() {
        let photo = timestamped_name(MediaKind::Photo, "jpg");
        assert!(photo.starts_with("IMG_") && photo.ends_with(".jpg"));
        let video = timestamped_name(MediaKind::Video, "webm");
        assert!(video.starts_with("video_") && video.ends_with(".webm"));
    }

    #[test]
    fn test_unique_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("IMG_1.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("IMG_1_1.jpg"), b"b").unwrap();

        assert_eq!(
            unique_path(dir.path(), "IMG_1.jpg"),
            dir.path().join("IMG_1_2.jpg")
        );
        assert_eq!(unique_path(dir.path(), "new.jpg"), dir.path().join("new.jpg"));
    }

    #[tokio::test]
    async fn test_save_media_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let file = MediaFile::new(b"webm-bytes".to_vec(), "video.webm", "video/webm");

        let path = save_media(MediaKind::Video, &file, &target).await.unwrap();
        assert_eq!(path.extension().unwrap(), "webm");
        assert_eq!(std::fs::read(&path).unwrap(), b"webm-bytes");
    }
}
