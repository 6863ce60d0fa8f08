//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod author;
mod media;
mod repository;

pub use author::AuthorResolver;
pub use media::{ImageUpload, MediaError, MediaStore};
pub use repository::{BaseRepository, CommentRepository, PostRepository, UserRepository};
