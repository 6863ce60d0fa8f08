//! Use cases shared by the resource API and the feed endpoints.
//!
//! Every operation is a single read or write against the repositories; the
//! service validates input, resolves authors through the [`AuthorResolver`]
//! port and assembles the read views (post + author + comment thread).

mod authors;
mod input;

pub use authors::GetOrCreateAuthor;
pub use input::{CommentChanges, CommentDraft, ImageChange, PostChanges, PostDraft, WriteMode};

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::domain::{Comment, CommentView, NewComment, NewPost, Post, PostView, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthorResolver, CommentRepository, ImageUpload, MediaError, MediaStore, PostRepository,
    UserRepository,
};
use crate::validation::{self, DEFAULT_COMMENT_AUTHOR, DEFAULT_POST_AUTHOR, FieldErrors};

/// Posts and comments, and the users who write them.
#[derive(Clone)]
pub struct FeedService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    media: Arc<dyn MediaStore>,
    authors: Arc<dyn AuthorResolver>,
}

impl FeedService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStore>,
        authors: Arc<dyn AuthorResolver>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
            media,
            authors,
        }
    }

    /// Wire the service with get-or-create author resolution over `users`.
    pub fn with_implicit_authors(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let authors = Arc::new(GetOrCreateAuthor::new(users.clone()));
        Self::new(users, posts, comments, media, authors)
    }

    pub fn media(&self) -> &Arc<dyn MediaStore> {
        &self.media
    }

    // ---- posts ----

    pub async fn create_post(&self, draft: PostDraft) -> Result<PostView, DomainError> {
        let mut errors = FieldErrors::new();
        let content = validation::required_text(&mut errors, "content", draft.content.as_deref());
        let username =
            validation::username(&mut errors, draft.username.as_deref(), DEFAULT_POST_AUTHOR);
        if let Some(upload) = &draft.image {
            self.check_image(&mut errors, upload)?;
        }

        let (content, username) = match (content, username) {
            (Some(content), Some(username)) if errors.is_empty() => (content, username),
            _ => return Err(DomainError::Validation(errors)),
        };

        let author = self.authors.resolve(&username).await?;
        let image = match draft.image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let post = match self
            .posts
            .insert(NewPost::new(author.id, content, image.clone()))
            .await
        {
            Ok(post) => post,
            Err(err) => {
                if let Some(path) = &image {
                    self.discard_image(path).await;
                }
                return Err(err.into());
            }
        };

        tracing::info!(
            post_id = post.id,
            author = %author.username,
            has_image = post.has_image(),
            preview = %post.preview(),
            "Post created"
        );
        Ok(PostView {
            post,
            author,
            comments: Vec::new(),
        })
    }

    /// Every post, newest first, each with its comments oldest first.
    pub async fn list_posts(&self) -> Result<Vec<PostView>, DomainError> {
        let posts = self.posts.list_newest_first().await?;
        let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let comments = self.comments.list_for_posts(&post_ids).await?;

        let authors = self
            .authors_of(
                posts
                    .iter()
                    .map(|p| p.user_id)
                    .chain(comments.iter().map(|c| c.user_id)),
            )
            .await?;

        let mut threads: HashMap<i64, Vec<CommentView>> = HashMap::new();
        for comment in comments {
            let author = lookup(&authors, comment.user_id)?;
            threads
                .entry(comment.post_id)
                .or_default()
                .push(CommentView { comment, author });
        }

        posts
            .into_iter()
            .map(|post| {
                let author = lookup(&authors, post.user_id)?;
                let comments = threads.remove(&post.id).unwrap_or_default();
                Ok(PostView {
                    post,
                    author,
                    comments,
                })
            })
            .collect()
    }

    pub async fn get_post(&self, id: i64) -> Result<PostView, DomainError> {
        let post = self.find_post(id).await?;
        self.view_of(post).await
    }

    pub async fn post_exists(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.posts.find_by_id(id).await?.is_some())
    }

    pub async fn update_post(
        &self,
        id: i64,
        changes: PostChanges,
        mode: WriteMode,
    ) -> Result<PostView, DomainError> {
        let mut post = self.find_post(id).await?;

        let mut errors = FieldErrors::new();
        let content = match (changes.content.as_deref(), mode) {
            (Some(raw), _) => validation::present_text(&mut errors, "content", raw),
            (None, WriteMode::Full) => {
                errors.add("content", validation::REQUIRED);
                None
            }
            (None, WriteMode::Partial) => None,
        };
        if let ImageChange::Replace(upload) = &changes.image {
            self.check_image(&mut errors, upload)?;
        }
        errors.into_result()?;

        if let Some(content) = content {
            post.content = content;
        }

        let previous_image = post.image.clone();
        let mut stored_image = None;
        match changes.image {
            ImageChange::Keep => {}
            ImageChange::Clear => post.image = None,
            ImageChange::Replace(upload) => {
                let path = self.store_image(upload).await?;
                stored_image = Some(path.clone());
                post.image = Some(path);
            }
        }
        post.touch();

        let post = match self.posts.update(post).await {
            Ok(post) => post,
            Err(err) => {
                if let Some(path) = &stored_image {
                    self.discard_image(path).await;
                }
                return Err(match err {
                    RepoError::NotFound => DomainError::post_not_found(id),
                    other => other.into(),
                });
            }
        };

        if let Some(old) = previous_image.filter(|old| post.image.as_ref() != Some(old)) {
            self.discard_image(&old).await;
        }

        tracing::info!(post_id = id, "Post updated");
        self.view_of(post).await
    }

    /// Delete a post together with all of its comments.
    pub async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        let post = self.find_post(id).await?;

        let removed = match self.posts.delete_with_comments(id).await {
            Ok(removed) => removed,
            Err(RepoError::NotFound) => return Err(DomainError::post_not_found(id)),
            Err(err) => return Err(err.into()),
        };

        if let Some(path) = &post.image {
            self.discard_image(path).await;
        }

        tracing::info!(post_id = id, comments_removed = removed, "Post deleted");
        Ok(())
    }

    // ---- comments ----

    pub async fn add_comment(&self, draft: CommentDraft) -> Result<CommentView, DomainError> {
        let mut errors = FieldErrors::new();
        let post_id = self
            .existing_post_ref(&mut errors, draft.post.as_deref(), WriteMode::Full)
            .await?;
        let content = validation::required_text(&mut errors, "content", draft.content.as_deref());
        let username =
            validation::username(&mut errors, draft.username.as_deref(), DEFAULT_COMMENT_AUTHOR);

        let (post_id, content, username) = match (post_id, content, username) {
            (Some(post_id), Some(content), Some(username)) if errors.is_empty() => {
                (post_id, content, username)
            }
            _ => return Err(DomainError::Validation(errors)),
        };

        let author = self.authors.resolve(&username).await?;
        let comment = self
            .comments
            .insert(NewComment::new(post_id, author.id, content))
            .await?;

        tracing::info!(
            comment_id = comment.id,
            post_id,
            author = %author.username,
            preview = %comment.preview(),
            "Comment added"
        );
        Ok(CommentView { comment, author })
    }

    /// Comments on one post, oldest first. Fails if the post does not exist.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        if !self.post_exists(post_id).await? {
            return Err(DomainError::post_not_found(post_id));
        }
        let comments = self.comments.list_for_post(post_id).await?;
        self.comment_views(comments).await
    }

    pub async fn list_all_comments(&self) -> Result<Vec<CommentView>, DomainError> {
        let comments = self.comments.list_oldest_first().await?;
        self.comment_views(comments).await
    }

    pub async fn get_comment(&self, id: i64) -> Result<CommentView, DomainError> {
        let comment = self.find_comment(id).await?;
        let author = self.author(comment.user_id).await?;
        Ok(CommentView { comment, author })
    }

    pub async fn update_comment(
        &self,
        id: i64,
        changes: CommentChanges,
        mode: WriteMode,
    ) -> Result<CommentView, DomainError> {
        let mut comment = self.find_comment(id).await?;

        let mut errors = FieldErrors::new();
        let post_id = self
            .existing_post_ref(&mut errors, changes.post.as_deref(), mode)
            .await?;
        let content = match (changes.content.as_deref(), mode) {
            (Some(raw), _) => validation::present_text(&mut errors, "content", raw),
            (None, WriteMode::Full) => {
                errors.add("content", validation::REQUIRED);
                None
            }
            (None, WriteMode::Partial) => None,
        };
        errors.into_result()?;

        if let Some(post_id) = post_id {
            comment.post_id = post_id;
        }
        if let Some(content) = content {
            comment.content = content;
        }

        let comment = self.comments.update(comment).await.map_err(|err| match err {
            RepoError::NotFound => DomainError::comment_not_found(id),
            other => other.into(),
        })?;

        tracing::info!(comment_id = id, "Comment updated");
        let author = self.author(comment.user_id).await?;
        Ok(CommentView { comment, author })
    }

    pub async fn delete_comment(&self, id: i64) -> Result<(), DomainError> {
        match self.comments.delete(id).await {
            Ok(()) => {
                tracing::info!(comment_id = id, "Comment deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::comment_not_found(id)),
            Err(err) => Err(err.into()),
        }
    }

    // ---- helpers ----

    async fn find_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    async fn find_comment(&self, id: i64) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::comment_not_found(id))
    }

    /// Validate a `post` reference and check the post exists.
    async fn existing_post_ref(
        &self,
        errors: &mut FieldErrors,
        raw: Option<&str>,
        mode: WriteMode,
    ) -> Result<Option<i64>, DomainError> {
        if raw.is_none() && mode == WriteMode::Partial {
            return Ok(None);
        }
        let Some(post_id) = validation::primary_key(errors, "post", raw) else {
            return Ok(None);
        };
        if !self.post_exists(post_id).await? {
            errors.add("post", validation::missing_pk(post_id));
            return Ok(None);
        }
        Ok(Some(post_id))
    }

    async fn view_of(&self, post: Post) -> Result<PostView, DomainError> {
        let comments = self.comments.list_for_post(post.id).await?;
        let authors = self
            .authors_of(
                std::iter::once(post.user_id).chain(comments.iter().map(|c| c.user_id)),
            )
            .await?;

        let author = lookup(&authors, post.user_id)?;
        let comments = comments
            .into_iter()
            .map(|comment| {
                let author = lookup(&authors, comment.user_id)?;
                Ok(CommentView { comment, author })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(PostView {
            post,
            author,
            comments,
        })
    }

    async fn comment_views(&self, comments: Vec<Comment>) -> Result<Vec<CommentView>, DomainError> {
        let authors = self.authors_of(comments.iter().map(|c| c.user_id)).await?;
        comments
            .into_iter()
            .map(|comment| {
                let author = lookup(&authors, comment.user_id)?;
                Ok(CommentView { comment, author })
            })
            .collect()
    }

    async fn author(&self, user_id: i64) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| missing_author(user_id))
    }

    async fn authors_of(
        &self,
        ids: impl Iterator<Item = i64>,
    ) -> Result<HashMap<i64, User>, DomainError> {
        let ids: Vec<i64> = ids.collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.users.find_many(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    fn check_image(
        &self,
        errors: &mut FieldErrors,
        upload: &ImageUpload,
    ) -> Result<(), DomainError> {
        match self.media.validate(upload) {
            Ok(()) => Ok(()),
            Err(MediaError::Rejected(message)) => {
                errors.add("image", message);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn store_image(&self, upload: ImageUpload) -> Result<String, DomainError> {
        match self.media.store(upload).await {
            Ok(path) => Ok(path),
            Err(MediaError::Rejected(message)) => {
                let mut errors = FieldErrors::new();
                errors.add("image", message);
                Err(DomainError::Validation(errors))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn discard_image(&self, path: &str) {
        if let Err(err) = self.media.remove(path).await {
            tracing::warn!(image = %path, error = %err, "Failed to remove image");
        }
    }
}

fn lookup(authors: &HashMap<i64, User>, user_id: i64) -> Result<User, DomainError> {
    authors
        .get(&user_id)
        .cloned()
        .ok_or_else(|| missing_author(user_id))
}

fn missing_author(user_id: i64) -> DomainError {
    DomainError::Internal(format!("user {user_id} referenced but not stored"))
}
