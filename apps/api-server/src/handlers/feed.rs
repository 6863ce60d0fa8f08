//! Feed endpoints used by the dashboard client.
//!
//! Thin adapters over the same service calls as the resource endpoints,
//! with their own success envelopes and simplified error messages.

use actix_web::{HttpRequest, HttpResponse, web};
use social_core::service::CommentDraft;
use social_core::validation::NOT_A_STRING;
use social_shared::MessageResponse;
use social_shared::dto::{
    CommentCreatedResponse, CommentListResponse, PostCreatedResponse, PostListResponse,
};

use super::body::read_form;
use super::posts::post_draft;
use super::representation::{MediaUrls, comment_response, post_response};
use super::{body_limit, parse_id};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// POST /api/create-post/
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let mut form = read_form(&req, payload, body_limit(&state)).await?;
    form.expect_text(&[("content", NOT_A_STRING), ("username", NOT_A_STRING)])?;
    if is_blank(form.text("content")) {
        return Err(AppError::BadRequest("Content is required".to_string()));
    }

    let view = state.feed.create_post(post_draft(&mut form)?).await?;

    let urls = MediaUrls::for_request(&req, &state.media_url);
    Ok(HttpResponse::Created().json(PostCreatedResponse {
        message: "Post created successfully".to_string(),
        post: post_response(view, &urls),
    }))
}

/// GET /api/get-posts/
pub async fn get_posts(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let urls = MediaUrls::for_request(&req, &state.media_url);
    let posts: Vec<_> = state
        .feed
        .list_posts()
        .await?
        .into_iter()
        .map(|view| post_response(view, &urls))
        .collect();

    Ok(HttpResponse::Ok().json(PostListResponse {
        count: posts.len(),
        posts,
    }))
}

/// DELETE /api/delete-post/{id}/
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    state.feed.delete_post(id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}

/// POST /api/add-comment/{post_id}/
pub async fn add_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path, "Post")?;
    if !state.feed.post_exists(post_id).await? {
        return Err(AppError::not_found("Post"));
    }

    let form = read_form(&req, payload, body_limit(&state)).await?;
    form.expect_text(&[("content", NOT_A_STRING), ("username", NOT_A_STRING)])?;
    if is_blank(form.text("content")) {
        return Err(AppError::BadRequest(
            "Comment content is required".to_string(),
        ));
    }

    let view = state
        .feed
        .add_comment(CommentDraft {
            post: Some(post_id.to_string()),
            content: form.text("content").map(str::to_owned),
            username: form.text("username").map(str::to_owned),
        })
        .await?;

    Ok(HttpResponse::Created().json(CommentCreatedResponse {
        message: "Comment added successfully".to_string(),
        comment: comment_response(view),
    }))
}

/// GET /api/get-comments/{post_id}/
pub async fn get_comments(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path, "Post")?;
    let comments: Vec<_> = state
        .feed
        .list_comments(post_id)
        .await?
        .into_iter()
        .map(comment_response)
        .collect();

    Ok(HttpResponse::Ok().json(CommentListResponse {
        count: comments.len(),
        comments,
    }))
}
