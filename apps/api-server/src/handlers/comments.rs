//! Comment resource endpoints.

use actix_web::{HttpRequest, HttpResponse, web};
use social_core::service::{CommentChanges, CommentDraft, WriteMode};
use social_core::validation::{INCORRECT_PK_TYPE, NOT_A_STRING};

use super::body::read_form;
use super::representation::comment_response;
use super::{body_limit, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/comments/
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let comments = state.feed.list_all_comments().await?;

    Ok(HttpResponse::Ok().json(
        comments
            .into_iter()
            .map(comment_response)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/comments/
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let form = read_form(&req, payload, body_limit(&state)).await?;
    form.expect_text(&[
        ("post", INCORRECT_PK_TYPE),
        ("content", NOT_A_STRING),
        ("username", NOT_A_STRING),
    ])?;

    let view = state
        .feed
        .add_comment(CommentDraft {
            post: form.text("post").map(str::to_owned),
            content: form.text("content").map(str::to_owned),
            username: form.text("username").map(str::to_owned),
        })
        .await?;

    Ok(HttpResponse::Created().json(comment_response(view)))
}

/// GET /api/comments/{id}/
pub async fn retrieve(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Comment")?;
    let view = state.feed.get_comment(id).await?;

    Ok(HttpResponse::Ok().json(comment_response(view)))
}

/// PUT /api/comments/{id}/
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    write(req, state, path, payload, WriteMode::Full).await
}

/// PATCH /api/comments/{id}/
pub async fn partial_update(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    write(req, state, path, payload, WriteMode::Partial).await
}

/// DELETE /api/comments/{id}/
pub async fn destroy(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Comment")?;
    state.feed.delete_comment(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn write(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
    mode: WriteMode,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Comment")?;
    let form = read_form(&req, payload, body_limit(&state)).await?;
    form.expect_text(&[("post", INCORRECT_PK_TYPE), ("content", NOT_A_STRING)])?;

    let changes = CommentChanges {
        post: form.text("post").map(str::to_owned),
        content: form.text("content").map(str::to_owned),
    };
    let view = state.feed.update_comment(id, changes, mode).await?;

    Ok(HttpResponse::Ok().json(comment_response(view)))
}
