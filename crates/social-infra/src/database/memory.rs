//! In-memory store - used when no database is configured, and in tests.
//!
//! Enforces the same constraints as the SQL schema: unique usernames,
//! foreign keys on posts and comments, and comment cascade on post delete.
//! Data is lost on process restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use social_core::domain::{Comment, NewComment, NewPost, NewUser, Post, User};
use social_core::error::RepoError;
use social_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

impl Tables {
    fn check_user(&self, user_id: i64) -> Result<(), RepoError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!("user {user_id} does not exist")))
        }
    }

    fn check_post(&self, post_id: i64) -> Result<(), RepoError> {
        if self.posts.contains_key(&post_id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!("post {post_id} does not exist")))
        }
    }
}

/// Shared tables behind the three in-memory repositories.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository {
            tables: self.tables.clone(),
        }
    }
}

pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

pub struct InMemoryCommentRepository {
    tables: Arc<RwLock<Tables>>,
}

fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn oldest_first(a: &Comment, b: &Comment) -> std::cmp::Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

#[async_trait]
impl BaseRepository<User, NewUser, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                new.username
            )));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            date_joined: new.date_joined,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.username == entity.username && u.id != entity.id)
        {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                entity.username
            )));
        }
        match tables.users.get_mut(&entity.id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let owned: Vec<i64> = tables
            .posts
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        tables
            .comments
            .retain(|_, c| c.user_id != id && !owned.contains(&c.post_id));
        tables.posts.retain(|_, p| p.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, NewPost, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, new: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_user(new.user_id)?;

        tables.last_post_id += 1;
        let post = Post {
            id: tables.last_post_id,
            user_id: new.user_id,
            content: new.content,
            image: new.image,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_user(entity.user_id)?;
        match tables.posts.get_mut(&entity.id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.delete_with_comments(id).await.map(|_| ())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self.tables.read().await.posts.values().cloned().collect();
        posts.sort_by(newest_first);
        Ok(posts)
    }

    async fn delete_with_comments(&self, id: i64) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.post_id != id);
        Ok((before - tables.comments.len()) as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, NewComment, i64> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, new: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post(new.post_id)?;
        tables.check_user(new.user_id)?;

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            post_id: new.post_id,
            user_id: new.user_id,
            content: new.content,
            created_at: new.created_at,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post(entity.post_id)?;
        tables.check_user(entity.user_id)?;
        match tables.comments.get_mut(&entity.id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        match self.tables.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        self.list_for_posts(&[post_id]).await
    }

    async fn list_for_posts(&self, post_ids: &[i64]) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .tables
            .read()
            .await
            .comments
            .values()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect();
        comments.sort_by(oldest_first);
        Ok(comments)
    }

    async fn list_oldest_first(&self) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> =
            self.tables.read().await.comments.values().cloned().collect();
        comments.sort_by(oldest_first);
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    async fn seed_post(db: &InMemoryDatabase, username: &str) -> (User, Post) {
        let user = db
            .users()
            .insert(NewUser::with_username(username))
            .await
            .unwrap();
        let post = db
            .posts()
            .insert(NewPost::new(user.id, "Hello".to_string(), None))
            .await
            .unwrap();
        (user, post)
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let db = InMemoryDatabase::new();
        db.users()
            .insert(NewUser::with_username("alice"))
            .await
            .unwrap();

        let err = db
            .users()
            .insert(NewUser::with_username("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_post_requires_existing_user() {
        let db = InMemoryDatabase::new();
        let err = db
            .posts()
            .insert(NewPost::new(42, "orphan".to_string(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_posts_listed_newest_first() {
        let db = InMemoryDatabase::new();
        let user = db
            .users()
            .insert(NewUser::with_username("alice"))
            .await
            .unwrap();
        let base = Utc::now();
        for (offset, content) in [(0, "first"), (10, "second"), (5, "third")] {
            let mut new = NewPost::new(user.id, content.to_string(), None);
            new.created_at = base + Duration::seconds(offset);
            db.posts().insert(new).await.unwrap();
        }

        let contents: Vec<String> = db
            .posts()
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.content)
            .collect();
        assert_eq!(contents, ["second", "third", "first"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_fall_back_to_id() {
        let db = InMemoryDatabase::new();
        let (user, first) = seed_post(&db, "alice").await;
        let mut new = NewPost::new(user.id, "twin".to_string(), None);
        new.created_at = first.created_at;
        let second = db.posts().insert(new).await.unwrap();

        let ids: Vec<i64> = db
            .posts()
            .list_newest_first()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, [second.id, first.id]);
    }

    #[tokio::test]
    async fn test_comments_listed_oldest_first() {
        let db = InMemoryDatabase::new();
        let (user, post) = seed_post(&db, "alice").await;
        let base = Utc::now();
        for (offset, content) in [(3, "late"), (1, "early")] {
            let mut new = NewComment::new(post.id, user.id, content.to_string());
            new.created_at = base + Duration::seconds(offset);
            db.comments().insert(new).await.unwrap();
        }

        let contents: Vec<String> = db
            .comments()
            .list_for_post(post.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, ["early", "late"]);
    }

    #[tokio::test]
    async fn test_delete_post_cascades_to_comments() {
        let db = InMemoryDatabase::new();
        let (user, post) = seed_post(&db, "alice").await;
        let (_, other) = seed_post(&db, "bob").await;
        for target in [post.id, post.id, other.id] {
            db.comments()
                .insert(NewComment::new(target, user.id, "hi".to_string()))
                .await
                .unwrap();
        }

        let removed = db.posts().delete_with_comments(post.id).await.unwrap();

        assert_eq!(removed, 2);
        assert!(db.comments().list_for_post(post.id).await.unwrap().is_empty());
        assert_eq!(db.comments().list_oldest_first().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = InMemoryDatabase::new();
        let err = db.posts().delete_with_comments(7).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_comment_requires_existing_post() {
        let db = InMemoryDatabase::new();
        let user = db
            .users()
            .insert(NewUser::with_username("alice"))
            .await
            .unwrap();
        let err = db
            .comments()
            .insert(NewComment::new(99, user.id, "hi".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
