use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{User, content_preview};

/// Comment entity - a reply attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn preview(&self) -> String {
        content_preview(&self.content)
    }
}

/// A comment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(post_id: i64, user_id: i64, content: String) -> Self {
        Self {
            post_id,
            user_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// A comment together with its author.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub author: User,
}
