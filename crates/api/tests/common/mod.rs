//! Shared harness for HTTP-level integration tests.
//!
//! Requests go through [`build_app_router`], so tests see the same middleware
//! stack as production. Uploads land in a per-test temporary directory.
#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use mediaboard_api::auth::jwt::{generate_access_token, JwtConfig};
use mediaboard_api::auth::password::hash_password;
use mediaboard_api::config::ServerConfig;
use mediaboard_api::router::build_app_router;
use mediaboard_api::state::AppState;
use mediaboard_db::models::user::{CreateUser, User};
use mediaboard_db::repositories::UserRepo;

/// Password given to every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

const MULTIPART_BOUNDARY: &str = "mediaboard-test-boundary";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 30,
    }
}

/// A `ServerConfig` with safe defaults and uploads under `upload_dir`.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        max_upload_bytes: 1024 * 1024,
        max_request_bytes: 16 * 1024 * 1024,
        allow_admin_signup: false,
        jwt: test_jwt_config(),
    }
}

/// The router plus the temporary upload directory backing it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    uploads: TempDir,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, |_| {})
    }

    /// Build an app after adjusting the default test configuration.
    pub fn with_config(pool: PgPool, adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");
        let mut config = test_config(uploads.path().to_path_buf());
        adjust(&mut config);

        let state = AppState::new(pool, config.clone());
        let router = build_app_router(state.clone(), &config);
        Self {
            router,
            state,
            uploads,
        }
    }

    /// Absolute location of a stored relative path.
    pub fn stored_path(&self, stored: &str) -> PathBuf {
        self.uploads.path().join(stored)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user directly into the database with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, login: &str, is_admin: bool) -> User {
    let input = CreateUser {
        login: login.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        nick: format!("{login}-nick"),
        is_admin,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// A valid bearer token for `user`.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role(), &test_jwt_config()).expect("token generation")
}

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

pub fn empty(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    request(method, uri, token).body(Body::empty()).unwrap()
}

pub fn json(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        name: &'a str,
        media_type: &'a str,
        data: &'a [u8],
    },
}

/// A file part for the repeated `files` field.
pub fn file_part<'a>(name: &'a str, media_type: &'a str, data: &'a [u8]) -> Part<'a> {
    Part::File {
        field: "files",
        name,
        media_type,
        data,
    }
}

pub fn multipart(method: Method, uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                name,
                media_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                         Content-Type: {media_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    request(method, uri, token)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Create a post through the API and return its JSON.
pub async fn create_post(app: &TestApp, token: &str, parts: &[Part<'_>]) -> serde_json::Value {
    let response = app
        .send(multipart(Method::POST, "/api/v1/posts", Some(token), parts))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
