//! Raw write inputs as they arrive from a client, before validation.

use crate::ports::ImageUpload;

/// Fields submitted to create a post.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub content: Option<String>,
    pub username: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Fields submitted to create a comment. `post` is the raw id text.
#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub post: Option<String>,
    pub content: Option<String>,
    pub username: Option<String>,
}

/// What an update does to a post's image.
#[derive(Debug, Clone, Default)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(ImageUpload),
    Clear,
}

/// Fields submitted to update a post. `None` means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub content: Option<String>,
    pub image: ImageChange,
}

/// Fields submitted to update a comment. `None` means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub post: Option<String>,
    pub content: Option<String>,
}

/// Whether an update must supply every writable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}
