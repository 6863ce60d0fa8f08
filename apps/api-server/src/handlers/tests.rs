use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_TYPE, HeaderValue};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::{configure_routes, not_found};
use crate::config::MediaConfig;
use crate::observability::{REQUEST_ID_HEADER, RequestIdMiddleware};
use crate::state::AppState;

const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R',
];
const BOUNDARY: &str = "----socialtestboundary";

fn state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let media = MediaConfig {
        root: dir.path().to_path_buf(),
        url_prefix: "/media/".to_string(),
        max_upload_bytes: 1024,
    };
    (AppState::in_memory(&media), dir)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($state.clone()))
                .configure(|cfg| configure_routes(cfg, "/media/"))
                .default_service(web::to(not_found)),
        )
        .await
    };
}

/// Send a request, returning the status and the JSON body (null when empty).
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }};
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

#[actix_web::test]
async fn test_feed_scenario() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/create-post/")
            .set_json(json!({"content": "Hello", "username": "alice"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Post created successfully");
    assert_eq!(body["post"]["user"]["username"], "alice");
    assert_eq!(body["post"]["comments_count"], 0);
    assert!(body["post"]["image"].is_null());
    let post_id = body["post"]["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/add-comment/{post_id}/"))
            .set_json(json!({"content": "Nice!", "username": "bob"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Comment added successfully");
    assert_eq!(body["comment"]["post"], post_id);
    assert_eq!(body["comment"]["user"]["username"], "bob");

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/get-posts/"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["posts"][0]["comments_count"], 1);
    assert_eq!(body["posts"][0]["comments"][0]["content"], "Nice!");

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/delete-post/{post_id}/"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Post deleted successfully"}));

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/get-comments/{post_id}/"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));
}

#[actix_web::test]
async fn test_create_post_blank_content() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/create-post/")
            .set_json(json!({"content": "   "}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Content is required"}));

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/get-posts/"));
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn test_create_post_from_form_defaults_to_admin() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/create-post")
            .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("content=++Trimmed+post++")
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["user"]["username"], "admin");
    assert_eq!(body["post"]["content"], "Trimmed post");
}

#[actix_web::test]
async fn test_same_username_resolves_to_same_user() {
    let (state, _dir) = state();
    let app = app!(state);

    let mut ids = Vec::new();
    for content in ["one", "two"] {
        let (_, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/create-post/")
                .set_json(json!({"content": content, "username": "carol"}))
        );
        ids.push(body["post"]["user"]["id"].clone());
    }
    assert_eq!(ids[0], ids[1]);
}

#[actix_web::test]
async fn test_add_comment_checks_post_then_content() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/add-comment/42/")
            .set_json(json!({"content": ""}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/add-comment/42/")
            .set_json(json!({"content": "orphan"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/comments/"));
    assert_eq!(body, json!([]));

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/create-post/")
            .set_json(json!({"content": "post"}))
    );
    let post_id = body["post"]["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/add-comment/{post_id}/"))
            .set_json(json!({"content": "  "}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Comment content is required"}));

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/add-comment/{post_id}/"))
            .set_json(json!({"content": "hi"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["user"]["username"], "anonymous");
}

#[actix_web::test]
async fn test_posts_newest_first_comments_oldest_first() {
    let (state, _dir) = state();
    let app = app!(state);

    let mut post_ids = Vec::new();
    for content in ["first", "second", "third"] {
        let (_, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/posts/")
                .set_json(json!({"content": content}))
        );
        post_ids.push(body["id"].as_i64().unwrap());
    }
    for content in ["a", "b"] {
        send!(
            app,
            test::TestRequest::post()
                .uri("/api/comments/")
                .set_json(json!({"post": post_ids[0], "content": content}))
        );
    }

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/get-posts/"));
    let listed: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["content"].as_str().unwrap())
        .collect();
    assert_eq!(listed, ["third", "second", "first"]);

    let (_, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/get-comments/{}/", post_ids[0]))
    );
    assert_eq!(body["count"], 2);
    assert_eq!(body["comments"][0]["content"], "a");
    assert_eq!(body["comments"][1]["content"], "b");
}

#[actix_web::test]
async fn test_resource_create_reports_field_errors() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/posts/").set_json(json!({}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": {"content": ["This field is required."]}})
    );

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/comments/")
            .set_json(json!({"post": "abc", "content": "hi"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": {"post": ["Incorrect type. Expected pk value."]}})
    );

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/comments/")
            .set_json(json!({"post": 99, "content": "hi"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": {"post": ["Invalid pk \"99\" - object does not exist."]}})
    );
}

#[actix_web::test]
async fn test_resource_update_and_delete() {
    let (state, _dir) = state();
    let app = app!(state);

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .set_json(json!({"content": "draft"}))
    );
    let id = body["id"].as_i64().unwrap();
    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/comments/")
            .set_json(json!({"post": id, "content": "reply"}))
    );
    let comment_id = body["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/posts/{id}/"))
            .set_json(json!({"content": "final"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "final");
    assert_eq!(body["comments_count"], 1);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/posts/{id}/"))
            .set_json(json!({}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": {"content": ["This field is required."]}})
    );

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/posts/{id}/"))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/comments/{comment_id}/"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/posts/{id}"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));
}

#[actix_web::test]
async fn test_non_integer_id_is_not_found() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/posts/abc/"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));

    let (status, _) = send!(
        app,
        test::TestRequest::delete().uri("/api/delete-post/x1/")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_missing_post() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri("/api/delete-post/999/")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found"}));
}

#[actix_web::test]
async fn test_non_string_json_fields_rejected() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .set_json(json!({"content": ["a", "b"], "username": {"x": 1}}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": {
            "content": ["Not a valid string."],
            "username": ["Not a valid string."]
        }})
    );

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/create-post/")
            .set_json(json!({"content": true}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"errors": {"content": ["Not a valid string."]}}));

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/get-posts/"));
    assert_eq!(body["count"], 0);

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .set_json(json!({"content": "real"}))
    );
    let post_id = body["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/comments/")
            .set_json(json!({"post": [post_id], "content": "hi"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": {"post": ["Incorrect type. Expected pk value."]}})
    );

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/add-comment/{post_id}/"))
            .set_json(json!({"content": "hi", "username": false}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"errors": {"username": ["Not a valid string."]}}));

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/comments/"));
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn test_image_upload_served_from_media() {
    let (state, _dir) = state();
    let app = app!(state);

    let (content_type, payload) = multipart(&[
        Part::Text("content", "With a picture"),
        Part::Text("username", "dave"),
        Part::File("image", "cat.png", PNG),
    ]);
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/create-post/")
            .insert_header(("host", "social.test"))
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(payload)
    );
    assert_eq!(status, StatusCode::CREATED);

    let image = body["post"]["image"].as_str().unwrap().to_string();
    assert!(image.starts_with("http://social.test/media/posts/"));
    assert!(image.ends_with(".png"));

    let path = image.trim_start_matches("http://social.test");
    let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(CONTENT_TYPE),
        Some(&HeaderValue::from_static("image/png"))
    );
    assert_eq!(test::read_body(resp).await.as_ref(), PNG);
}

#[actix_web::test]
async fn test_non_image_upload_rejected() {
    let (state, _dir) = state();
    let app = app!(state);

    let (content_type, payload) = multipart(&[
        Part::Text("content", "Not really a picture"),
        Part::File("image", "notes.png", b"plain text"),
    ]);
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(payload)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["image"][0]
        .as_str()
        .unwrap()
        .starts_with("Upload a valid image."));
}

#[actix_web::test]
async fn test_oversized_body_rejected() {
    let (state, _dir) = state();
    let app = app!(state);

    let big = "x".repeat(state.max_upload_bytes + super::body::FORM_OVERHEAD_BYTES + 1);
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .set_json(json!({ "content": big }))
    );
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn test_unsupported_content_type() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/posts/")
            .insert_header((CONTENT_TYPE, "text/plain"))
            .set_payload("content=hi")
    );
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("text/plain"));
}

#[actix_web::test]
async fn test_media_outside_root_not_served() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, _) = send!(app, test::TestRequest::get().uri("/media/../Cargo.toml"));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send!(app, test::TestRequest::get().uri("/media/posts/missing.png"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_request_id_echoed() {
    let (state, _dir) = state();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/health")
            .insert_header((REQUEST_ID_HEADER, "abc-123"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(REQUEST_ID_HEADER),
        Some(&HeaderValue::from_static("abc-123"))
    );

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
}

#[actix_web::test]
async fn test_health_reports_memory_store() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[actix_web::test]
async fn test_unknown_route() {
    let (state, _dir) = state();
    let app = app!(state);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/nothing-here/"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}
