//! Post resource endpoints.

use actix_web::{HttpRequest, HttpResponse, web};
use social_core::service::{ImageChange, PostChanges, PostDraft, WriteMode};
use social_core::validation::{FieldErrors, NOT_A_STRING};

use super::body::{FieldValue, FormData, read_form};
use super::representation::{MediaUrls, post_response};
use super::{body_limit, parse_id};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

/// GET /api/posts/
pub async fn list(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let urls = MediaUrls::for_request(&req, &state.media_url);
    let posts = state.feed.list_posts().await?;

    Ok(HttpResponse::Ok().json(
        posts
            .into_iter()
            .map(|view| post_response(view, &urls))
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/posts/
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let mut form = read_form(&req, payload, body_limit(&state)).await?;
    let draft = post_draft(&mut form)?;

    let view = state.feed.create_post(draft).await?;

    let urls = MediaUrls::for_request(&req, &state.media_url);
    Ok(HttpResponse::Created().json(post_response(view, &urls)))
}

/// GET /api/posts/{id}/
pub async fn retrieve(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    let view = state.feed.get_post(id).await?;

    let urls = MediaUrls::for_request(&req, &state.media_url);
    Ok(HttpResponse::Ok().json(post_response(view, &urls)))
}

/// PUT /api/posts/{id}/
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    write(req, state, path, payload, WriteMode::Full).await
}

/// PATCH /api/posts/{id}/
pub async fn partial_update(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    write(req, state, path, payload, WriteMode::Partial).await
}

/// DELETE /api/posts/{id}/
pub async fn destroy(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    state.feed.delete_post(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn write(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
    mode: WriteMode,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    let mut form = read_form(&req, payload, body_limit(&state)).await?;
    form.expect_text(&[("content", NOT_A_STRING)])?;

    let changes = PostChanges {
        content: form.text("content").map(str::to_owned),
        image: image_change(&mut form)?,
    };
    let view = state.feed.update_post(id, changes, mode).await?;

    let urls = MediaUrls::for_request(&req, &state.media_url);
    Ok(HttpResponse::Ok().json(post_response(view, &urls)))
}

/// Fields for a new post. An `image` sent as text rather than a file is an error.
pub(super) fn post_draft(form: &mut FormData) -> AppResult<PostDraft> {
    form.expect_text(&[("content", NOT_A_STRING), ("username", NOT_A_STRING)])?;
    let image = match image_change(form)? {
        ImageChange::Replace(upload) => Some(upload),
        ImageChange::Keep | ImageChange::Clear => None,
    };

    Ok(PostDraft {
        content: form.text("content").map(str::to_owned),
        username: form.text("username").map(str::to_owned),
        image,
    })
}

/// Uploaded file replaces, `null` or an empty value clears, absence keeps.
fn image_change(form: &mut FormData) -> AppResult<ImageChange> {
    if let Some(upload) = form.take_file("image") {
        return Ok(ImageChange::Replace(upload));
    }

    match form.field("image") {
        None => Ok(ImageChange::Keep),
        Some(FieldValue::Null) => Ok(ImageChange::Clear),
        Some(FieldValue::Text(text)) if text.is_empty() => Ok(ImageChange::Clear),
        Some(FieldValue::Text(_) | FieldValue::Invalid) => {
            let mut errors = FieldErrors::new();
            errors.add("image", NOT_A_FILE);
            Err(AppError::Validation(errors))
        }
    }
}
