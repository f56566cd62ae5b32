use crate::modules::movie::model::Quality;
use std::path::{Component, Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const UPLOADS_DIR: &str = "videos";
const STAGING_DIR: &str = "videos/local";
const CONVERTED_DIR: &str = "videos/converted";

pub const STAGED_VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// A file location both as the catalog records it and as the filesystem sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPath {
    pub absolute: PathBuf,
    pub relative: String,
}

/// Fixed on-disk layout under the media root. Catalog paths are relative to the root.
#[derive(Debug, Clone)]
pub struct MediaPaths {
    root: PathBuf,
}

impl MediaPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn converted_dir(&self) -> PathBuf {
        self.root.join(CONVERTED_DIR)
    }

    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [self.uploads_dir(), self.staging_dir(), self.converted_dir()] {
            if !dir.exists() {
                tokio::fs::create_dir_all(&dir).await?;
                info!("Created media directory {}", dir.display());
            }
        }
        Ok(())
    }

    fn stored(&self, relative: String) -> StoredPath {
        StoredPath {
            absolute: self.root.join(&relative),
            relative,
        }
    }

    pub fn original_upload(&self, movie_id: Uuid, extension: &str) -> StoredPath {
        self.stored(format!("{}/{}_original.{}", UPLOADS_DIR, movie_id, extension))
    }

    /// `run_id` already carries the movie id, so outputs of different runs never collide.
    pub fn rendition_output(&self, run_id: &str, quality: Quality) -> StoredPath {
        self.stored(format!("{}/{}_{}.mp4", CONVERTED_DIR, run_id, quality.as_str()))
    }

    /// Maps a catalog path onto the filesystem. Absolute paths and `..` are refused.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let candidate = Path::new(relative);
        let mut clean = PathBuf::new();
        for component in candidate.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if clean.as_os_str().is_empty() {
            return None;
        }
        Some(self.root.join(clean))
    }

    /// Like [`resolve`](Self::resolve) but only for files inside the staging directory.
    pub fn resolve_staged(&self, relative: &str) -> Option<StoredPath> {
        let normalized = relative.replace('\\', "/");
        let absolute = self.resolve(&normalized)?;
        if !absolute.starts_with(self.staging_dir()) || absolute == self.staging_dir() {
            return None;
        }
        let relative = absolute
            .strip_prefix(&self.root)
            .ok()?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Some(StoredPath { absolute, relative })
    }

    pub async fn list_staged_videos(&self) -> std::io::Result<Vec<String>> {
        let dir = self.staging_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut videos = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_video = Path::new(&name)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| STAGED_VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_video {
                videos.push(format!("{}/{}", STAGING_DIR, name));
            }
        }
        videos.sort();
        Ok(videos)
    }
}
