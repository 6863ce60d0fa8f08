//! Serves uploaded images.

use actix_web::{HttpResponse, http::header, web};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET {MEDIA_URL}{path}
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let path = path.into_inner();
    let Some(bytes) = state.feed.media().load(&path).await? else {
        return Err(AppError::NotFound("Not found".to_string()));
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type.essence_str()))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
