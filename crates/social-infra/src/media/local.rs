//! Filesystem media store - uploaded images live under a media root directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use uuid::Uuid;

use social_core::ports::{ImageUpload, MediaError, MediaStore};
use social_core::validation::{EMPTY_FILE, FILE_TOO_LARGE, INVALID_IMAGE};

/// Directory under the media root that holds post images.
const UPLOAD_DIR: &str = "posts";

/// Stores images as `<root>/posts/<uuid>.<ext>`.
///
/// Uploads are sniffed by their leading bytes; the client's file name and
/// declared content type are ignored.
pub struct LocalMediaStore {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Map a media-relative path to a file under the root.
    /// Anything that could escape the root is refused.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let mut parts = relative.components().peekable();
        parts.peek()?;
        if parts.all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(relative))
        } else {
            None
        }
    }

    fn sniff(&self, upload: &ImageUpload) -> Result<&'static str, MediaError> {
        if upload.bytes.is_empty() {
            return Err(MediaError::Rejected(EMPTY_FILE.to_string()));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(MediaError::Rejected(FILE_TOO_LARGE.to_string()));
        }

        match image::guess_format(&upload.bytes) {
            Ok(ImageFormat::Png) => Ok("png"),
            Ok(ImageFormat::Jpeg) => Ok("jpg"),
            Ok(ImageFormat::Gif) => Ok("gif"),
            Ok(ImageFormat::WebP) => Ok("webp"),
            Ok(ImageFormat::Bmp) => Ok("bmp"),
            _ => Err(MediaError::Rejected(INVALID_IMAGE.to_string())),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn validate(&self, upload: &ImageUpload) -> Result<(), MediaError> {
        self.sniff(upload).map(|_| ())
    }

    async fn store(&self, upload: ImageUpload) -> Result<String, MediaError> {
        let extension = self.sniff(&upload)?;
        let relative = format!("{UPLOAD_DIR}/{}.{extension}", Uuid::new_v4().simple());

        let dir = self.root.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MediaError::Storage(format!("{}: {e}", dir.display())))?;

        let path = self.root.join(&relative);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| MediaError::Storage(format!("{}: {e}", path.display())))?;

        tracing::debug!(
            image = %relative,
            bytes = upload.bytes.len(),
            original = upload.filename.as_deref().unwrap_or(""),
            "Stored image"
        );
        Ok(relative)
    }

    async fn load(&self, relative: &str) -> Result<Option<Vec<u8>>, MediaError> {
        let Some(path) = self.resolve(relative) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                Ok(None)
            }
            Err(e) => Err(MediaError::Storage(format!("{}: {e}", path.display()))),
        }
    }

    async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let Some(path) = self.resolve(relative) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(image = %relative, "Removed image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Storage(format!("{}: {e}", path.display()))),
        }
    }
}
