use async_trait::async_trait;

use crate::domain::{Comment, NewComment, NewPost, NewUser, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// `N` is the not-yet-stored form of `T`; identifiers are assigned by the store.
#[async_trait]
pub trait BaseRepository<T, N, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity and return it with its assigned ID.
    async fn insert(&self, new: N) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, NewUser, i64> {
    /// Find a user by exact, case-sensitive username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Fetch every user whose id is in `ids`, in no particular order.
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, NewPost, i64> {
    /// All posts, `created_at` descending, ties by `id` descending.
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError>;

    /// Delete a post and every comment on it atomically.
    /// Returns the number of comments removed.
    async fn delete_with_comments(&self, id: i64) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, NewComment, i64> {
    /// Comments on one post, `created_at` ascending, ties by `id` ascending.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;

    /// Comments on any of `post_ids`, in the same order as `list_for_post`.
    async fn list_for_posts(&self, post_ids: &[i64]) -> Result<Vec<Comment>, RepoError>;

    /// Every comment, oldest first.
    async fn list_oldest_first(&self) -> Result<Vec<Comment>, RepoError>;
}
