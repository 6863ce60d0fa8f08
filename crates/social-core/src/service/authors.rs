use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthorResolver, UserRepository};

/// Resolves a username to a user, provisioning a credential-less user on first use.
pub struct GetOrCreateAuthor {
    users: Arc<dyn UserRepository>,
}

impl GetOrCreateAuthor {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthorResolver for GetOrCreateAuthor {
    async fn resolve(&self, username: &str) -> Result<User, DomainError> {
        if let Some(user) = self.users.find_by_username(username).await? {
            return Ok(user);
        }

        match self.users.insert(NewUser::with_username(username)).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "Provisioned user");
                Ok(user)
            }
            // Another request created the same username first.
            Err(RepoError::Constraint(_)) => self
                .users
                .find_by_username(username)
                .await?
                .ok_or_else(|| {
                    DomainError::Internal(format!("user {username} missing after conflict"))
                }),
            Err(err) => Err(err.into()),
        }
    }
}
