//! Router harness for route tests backed by in-memory repositories.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Duration;
use foodgram_core::repository::{TokenRepository, UserRecord};
use foodgram_test_support::{InMemoryImageStore, InMemoryStore, ManualClock, fixed_now};
use foodgram_users::domain::token::token_digest;
use http_body_util::BodyExt;
use image::{ImageBuffer, ImageFormat, Rgb};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::app;
use crate::state::{ApiSettings, AppState, Store};

pub(crate) const PUBLIC_URL: &str = "http://testserver";

pub(crate) fn settings() -> ApiSettings {
    ApiSettings {
        public_url: PUBLIC_URL.to_owned(),
        page_size: 6,
        recipes_limit: 3,
    }
}

/// Builds the full application around `store`.
pub(crate) fn router_for<S: Store>(store: Arc<S>, images: Arc<InMemoryImageStore>, clock: Arc<ManualClock>) -> Router {
    let state = AppState::new(store, images, clock, Duration::seconds(60), settings());
    app(state, Path::new("media"))
}

/// A 1x1 PNG as a data URI.
pub(crate) fn png_data_uri() -> String {
    let pixels = ImageBuffer::from_pixel(1, 1, Rgb([200u8, 120, 40]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    pixels.write_to(&mut bytes, ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}

pub(crate) struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub images: Arc<InMemoryImageStore>,
    pub clock: Arc<ManualClock>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let images = Arc::new(InMemoryImageStore::new());
        let clock = Arc::new(ManualClock::new(fixed_now()));
        let router = router_for(Arc::clone(&store), Arc::clone(&images), Arc::clone(&clock));
        Self {
            store,
            images,
            clock,
            router,
        }
    }

    /// Registers `username` through the API with password `Str0ngPass!`.
    pub async fn register(&self, username: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/users/",
                None,
                &json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                    "password": "Str0ngPass!",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    /// Seeds a user directly in the store together with a valid token.
    pub async fn authed(&self, username: &str) -> (UserRecord, String) {
        let user = self.store.add_user(username, "unused-hash");
        let token = format!("{username:0<40}");
        self.store
            .insert_token(user.id, &token_digest(&token), fixed_now())
            .await
            .unwrap();
        (user, token)
    }

    pub async fn raw(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
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

        let response = self.raw(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }
}
