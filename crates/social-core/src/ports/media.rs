//! Media storage port - where uploaded images live.

use async_trait::async_trait;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied file name. Informational only, never used as a path.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        Self { filename, bytes }
    }
}

/// Media store trait - abstraction over asset backends.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Check an upload without storing it.
    fn validate(&self, upload: &ImageUpload) -> Result<(), MediaError>;

    /// Store an upload and return its media-relative path.
    async fn store(&self, upload: ImageUpload) -> Result<String, MediaError>;

    /// Read a stored asset. `Ok(None)` if there is no such asset.
    async fn load(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError>;

    /// Remove a stored asset. Removing a missing asset is not an error.
    async fn remove(&self, path: &str) -> Result<(), MediaError>;
}

/// Media errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The upload is unacceptable; the message is shown to the client.
    #[error("{0}")]
    Rejected(String),

    #[error("Media storage failed: {0}")]
    Storage(String),
}
