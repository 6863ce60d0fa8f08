//! Author resolution port.

use async_trait::async_trait;

use crate::domain::User;
use crate::error::DomainError;

/// Turns the identity attached to a write into a stored user.
///
/// The use cases never create users themselves; whoever wires the service
/// decides whether a name is looked up, provisioned, or checked against an
/// authenticated principal.
#[async_trait]
pub trait AuthorResolver: Send + Sync {
    async fn resolve(&self, username: &str) -> Result<User, DomainError>;
}
