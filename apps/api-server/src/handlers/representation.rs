//! Domain views to wire DTOs.

use actix_web::HttpRequest;
use social_core::domain::{CommentView, PostView, User};
use social_shared::dto::{CommentResponse, PostResponse, UserResponse};

/// Builds public URLs for stored media paths.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    /// `scheme://host` of the incoming request.
    origin: String,
    prefix: String,
}

impl MediaUrls {
    /// Absolute URLs on the host the request was addressed to.
    pub fn for_request(req: &HttpRequest, prefix: &str) -> Self {
        let info = req.connection_info();
        Self {
            origin: format!("{}://{}", info.scheme(), info.host()),
            prefix: prefix.to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        let relative = format!("{}{}", self.prefix, path.trim_start_matches('/'));
        if relative.starts_with('/') {
            format!("{}{relative}", self.origin)
        } else {
            relative
        }
    }
}

pub fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}

pub fn comment_response(view: CommentView) -> CommentResponse {
    let CommentView { comment, author } = view;
    CommentResponse {
        id: comment.id,
        post: comment.post_id,
        user: user_response(author),
        content: comment.content,
        created_at: comment.created_at,
    }
}

pub fn post_response(view: PostView, urls: &MediaUrls) -> PostResponse {
    let comments_count = view.comments_count();
    let PostView {
        post,
        author,
        comments,
    } = view;

    PostResponse {
        id: post.id,
        user: user_response(author),
        content: post.content,
        image: post.image.as_deref().map(|path| urls.url(path)),
        comments: comments.into_iter().map(comment_response).collect(),
        comments_count,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
