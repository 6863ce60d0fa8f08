use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentView, User, content_preview};

/// Post entity - a user-authored content item with an optional image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    /// Media-relative path of the attached image, e.g. `posts/3f2a.png`.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn preview(&self) -> String {
        content_preview(&self.content)
    }

    /// Mark the post as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: i64,
    pub content: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPost {
    /// Create a new post timestamped now.
    pub fn new(user_id: i64, content: String, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            content,
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post together with its author and its comments, oldest first.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author: User,
    pub comments: Vec<CommentView>,
}

impl PostView {
    /// Number of comments on the post, counted from the loaded thread.
    pub fn comments_count(&self) -> usize {
        self.comments.len()
    }
}
