//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use foodgram_api::state::{ApiSettings, AppState};
use foodgram_store::fs_image_store::FsImageStore;
use foodgram_store::pg_store::PgStore;
use foodgram_test_support::{FixedClock, fixed_now};
use http_body_util::BodyExt;
use image::{ImageBuffer, ImageFormat, Rgb};
use sqlx::PgPool;
use temp_dir::TempDir;
use tower::ServiceExt;

/// The app router plus the media directory it writes to. The directory is
/// removed when the value is dropped.
pub struct TestApp {
    pub router: Router,
    pub media: TempDir,
}

/// Build the full app with a real `PgStore`, a temporary media root and a
/// fixed clock. Uses the same route structure as `main.rs`.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let media = TempDir::new().unwrap();
    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(FsImageStore::new(media.path(), "http://testserver")),
        Arc::new(FixedClock(fixed_now())),
        chrono::Duration::seconds(60),
        ApiSettings {
            public_url: "http://testserver".to_owned(),
            page_size: 6,
            recipes_limit: 3,
        },
    );
    let router = foodgram_api::app(state, media.path());
    TestApp { router, media }
}

/// A 1x1 PNG as a data URI.
pub fn png_data_uri() -> String {
    let pixels = ImageBuffer::from_pixel(1, 1, Rgb([90u8, 160, 30]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    pixels.write_to(&mut bytes, ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}

/// Send a request and return the raw response.
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

async fn into_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &TestApp,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    into_json(send(app, Method::POST, uri, token, Some(body)).await).await
}

/// Send a GET request and return the response.
pub async fn get_json(
    app: &TestApp,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    into_json(send(app, Method::GET, uri, token, None).await).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> StatusCode {
    send(app, Method::DELETE, uri, token, None).await.status()
}

/// Register `username` and log in, returning the user id and token.
pub async fn sign_up(app: &TestApp, username: &str) -> (i64, String) {
    let (status, user) = post_json(
        app,
        "/api/users/",
        None,
        &serde_json::json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "first_name": "Test",
            "last_name": "User",
            "password": "Str0ngPass!",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");

    let (status, login) = post_json(
        app,
        "/api/auth/token/login/",
        None,
        &serde_json::json!({
            "email": format!("{username}@example.com"),
            "password": "Str0ngPass!",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{login}");

    (
        user["id"].as_i64().unwrap(),
        login["auth_token"].as_str().unwrap().to_owned(),
    )
}
