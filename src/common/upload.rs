use crate::common::error::{AppError, AppResult};
use axum::{extract::multipart::Field, http::StatusCode};
use bytes::Bytes;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{error, info, warn};

pub const ALLOWED_VIDEO_TYPES: [&str; 5] = [
    "video/mp4",
    "video/avi",
    "video/x-msvideo",
    "video/quicktime",
    "video/x-matroska",
];

/// Checks the declared content type of an uploaded part against the video allow-list.
pub fn validate_video_mime(content_type: &str) -> AppResult<()> {
    let essence = content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_VIDEO_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(AppError::InvalidFileType {
            content_type: content_type.to_string(),
        })
    }
}

/// Extension for the stored file: the client's file name wins, then the MIME type, then `mp4`.
pub fn stored_extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext;
    }

    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "mp4".to_string())
}

/// Buffered writer for one upload that enforces the size cap while streaming.
pub struct DiskUploader {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    limit: u64,
}

impl DiskUploader {
    pub async fn new(path: PathBuf, limit: u64) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = File::create(&path).await?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
            limit,
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> AppResult<()> {
        self.written += chunk.len() as u64;
        if self.written > self.limit {
            return Err(AppError::FileTooLarge {
                limit_bytes: self.limit,
            });
        }

        self.writer.write_all(&chunk).await?;
        Ok(())
    }

    /// Flushes and syncs the file. The file is removed if either step fails.
    pub async fn finish(mut self) -> AppResult<u64> {
        let synced = match self.writer.flush().await {
            Ok(()) => self.writer.get_ref().sync_all().await,
            Err(e) => Err(e),
        };

        match synced {
            Ok(()) => Ok(self.written),
            Err(e) => {
                error!("Failed to flush {}: {}", self.path.display(), e);
                self.abort().await;
                Err(e.into())
            }
        }
    }

    pub async fn abort(self) {
        let path = self.path.clone();
        drop(self.writer);
        remove_quietly(&path).await;
    }
}

/// Sibling of `path` that receives bytes until they are complete.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Deletes a file, logging rather than failing when it cannot be removed.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

pub async fn stream_to_disk(mut field: Field<'_>, path: PathBuf, limit: u64) -> AppResult<u64> {
    let mut uploader = DiskUploader::new(path, limit).await?;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Stream error: {}", e);
                let too_large = e.status() == StatusCode::PAYLOAD_TOO_LARGE;
                uploader.abort().await;
                return Err(if too_large {
                    AppError::FileTooLarge { limit_bytes: limit }
                } else {
                    AppError::Validation("Upload stream interrupted".to_string())
                });
            }
        };

        if let Err(e) = uploader.write_chunk(chunk).await {
            uploader.abort().await;
            return Err(e);
        }
    }

    uploader.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allow_listed_types() {
        for ct in ALLOWED_VIDEO_TYPES {
            assert!(validate_video_mime(ct).is_ok(), "{ct}");
        }
        assert!(validate_video_mime("video/MP4").is_ok());
        assert!(validate_video_mime("video/mp4; codecs=avc1").is_ok());
    }

    #[test]
    fn rejects_other_types() {
        assert!(matches!(
            validate_video_mime("image/png"),
            Err(AppError::InvalidFileType { .. })
        ));
        assert!(validate_video_mime("video/webm").is_err());
        assert!(validate_video_mime("").is_err());
    }

    #[test]
    fn extension_prefers_file_name() {
        assert_eq!(stored_extension(Some("Trailer.MKV"), "video/mp4"), "mkv");
        assert_eq!(stored_extension(Some("noext"), "video/x-unheard-of"), "mp4");

        let guessed = stored_extension(Some("../../evil.m/p4"), "video/quicktime");
        assert!(["mov", "qt"].contains(&guessed.as_str()), "{guessed}");
        assert_eq!(stored_extension(None, "application/x-unknown"), "mp4");
    }

    #[tokio::test]
    async fn uploader_enforces_limit() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        let mut uploader = DiskUploader::new(path.clone(), 8).await.unwrap();

        uploader.write_chunk(Bytes::from_static(b"12345")).await.unwrap();
        let err = uploader.write_chunk(Bytes::from_static(b"6789")).await.unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge { limit_bytes: 8 }));

        uploader.abort().await;
        assert!(!path.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn failed_flush_removes_the_file() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        std::os::unix::fs::symlink("/dev/full", &path).unwrap();

        let mut uploader = DiskUploader::new(path.clone(), 1024).await.unwrap();
        uploader.write_chunk(Bytes::from_static(b"abc")).await.unwrap();
        assert!(matches!(uploader.finish().await, Err(AppError::Io(_))));
        assert!(std::fs::symlink_metadata(&path).is_err());
    }

    #[tokio::test]
    async fn uploader_finishes_with_byte_count() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("clip.mp4");
        let mut uploader = DiskUploader::new(path.clone(), 1024).await.unwrap();
        uploader.write_chunk(Bytes::from_static(b"abc")).await.unwrap();

        assert_eq!(uploader.finish().await.unwrap(), 3);
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }
}
