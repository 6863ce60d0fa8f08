//! HTTP handlers and route configuration.

mod body;
mod comments;
mod feed;
mod health;
mod media;
mod posts;
mod representation;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, web};
use social_shared::ErrorResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
///
/// Every API path answers with and without a trailing slash. Media is
/// mounted under `media_prefix` unless that prefix points at another host.
pub fn configure_routes(cfg: &mut web::ServiceConfig, media_prefix: &str) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            // Resource endpoints
            .service(
                web::resource(["/posts", "/posts/"])
                    .route(web::get().to(posts::list))
                    .route(web::post().to(posts::create)),
            )
            .service(
                web::resource(["/posts/{id}", "/posts/{id}/"])
                    .route(web::get().to(posts::retrieve))
                    .route(web::put().to(posts::update))
                    .route(web::patch().to(posts::partial_update))
                    .route(web::delete().to(posts::destroy)),
            )
            .service(
                web::resource(["/comments", "/comments/"])
                    .route(web::get().to(comments::list))
                    .route(web::post().to(comments::create)),
            )
            .service(
                web::resource(["/comments/{id}", "/comments/{id}/"])
                    .route(web::get().to(comments::retrieve))
                    .route(web::put().to(comments::update))
                    .route(web::patch().to(comments::partial_update))
                    .route(web::delete().to(comments::destroy)),
            )
            // Feed endpoints
            .service(
                web::resource(["/create-post", "/create-post/"])
                    .route(web::post().to(feed::create_post)),
            )
            .service(
                web::resource(["/get-posts", "/get-posts/"]).route(web::get().to(feed::get_posts)),
            )
            .service(
                web::resource(["/delete-post/{id}", "/delete-post/{id}/"])
                    .route(web::delete().to(feed::delete_post)),
            )
            .service(
                web::resource(["/add-comment/{id}", "/add-comment/{id}/"])
                    .route(web::post().to(feed::add_comment)),
            )
            .service(
                web::resource(["/get-comments/{id}", "/get-comments/{id}/"])
                    .route(web::get().to(feed::get_comments)),
            ),
    );

    if media_prefix.starts_with('/') {
        cfg.service(
            web::resource(format!("{media_prefix}{{path:.+}}"))
                .route(web::get().to(media::serve)),
        );
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::message("Not found"))
}

/// Upper bound on a write request body.
fn body_limit(state: &AppState) -> usize {
    state.max_upload_bytes + body::FORM_OVERHEAD_BYTES
}

/// Path ids that are not integers name nothing.
fn parse_id(raw: &str, entity_type: &str) -> AppResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::not_found(entity_type))
}
