use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - an author of posts and comments.
///
/// Users are provisioned implicitly by username, so everything apart from
/// `username` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// A user that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl NewUser {
    /// A credential-less user known only by its username.
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            date_joined: Utc::now(),
        }
    }
}
