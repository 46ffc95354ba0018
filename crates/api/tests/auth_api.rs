//! HTTP-level tests for registration, login and user management.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, create_user, empty, json, token_for, TestApp, TEST_PASSWORD};
use serde_json::json as j;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_user(pool: PgPool) {
    let app = TestApp::new(pool);

    let body = j!({ "login": "alice", "password": "secret-pass", "nick": "Alice" });
    let response = app
        .send(json(Method::POST, "/api/v1/auth/register", None, body))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body_json(response).await;
    assert_eq!(user["login"], "alice");
    assert_eq!(user["nick"], "Alice");
    assert_eq!(user["is_admin"], false);
    assert!(user.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_duplicate_login_conflicts(pool: PgPool) {
    create_user(&pool, "taken", false).await;
    let app = TestApp::new(pool);

    let body = j!({ "login": "taken", "password": "secret-pass", "nick": "Other" });
    let response = app
        .send(json(Method::POST, "/api/v1/auth/register", None, body))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_admin_requires_signup_flag(pool: PgPool) {
    let body = j!({ "login": "boss", "password": "secret-pass", "nick": "Boss", "is_admin": true });

    let closed = TestApp::new(pool.clone());
    let response = closed
        .send(json(Method::POST, "/api/v1/auth/register", None, body.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let open = TestApp::with_config(pool, |c| c.allow_admin_signup = true);
    let response = open
        .send(json(Method::POST, "/api/v1/auth/register", None, body))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["is_admin"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_validates_input(pool: PgPool) {
    let app = TestApp::new(pool);

    for body in [
        j!({ "login": "", "password": "secret-pass", "nick": "n" }),
        j!({ "login": "bob", "password": "", "nick": "n" }),
        j!({ "login": "bob", "password": "x".repeat(73), "nick": "n" }),
        j!({ "login": "bob", "password": "secret-pass", "nick": "" }),
    ] {
        let response = app
            .send(json(Method::POST, "/api/v1/auth/register", None, body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_bearer_token(pool: PgPool) {
    let user = create_user(&pool, "carol", false).await;
    let app = TestApp::new(pool);

    let body = j!({ "login": "carol", "password": TEST_PASSWORD });
    let response = app
        .send(json(Method::POST, "/api/v1/auth/login", None, body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let token = body_json(response).await;
    assert_eq!(token["token_type"], "bearer");
    assert_eq!(token["expires_in"], 30 * 60);
    let access = token["access_token"].as_str().unwrap();

    let response = app
        .send(empty(Method::GET, "/api/v1/users/me", Some(access)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], user.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_route_returns_caller(pool: PgPool) {
    let user = create_user(&pool, "fay", false).await;
    let app = TestApp::new(pool);
    let token = token_for(&user);

    for path in ["/api/v1/users/me/profile", "/api/v1/users/me"] {
        let response = app.send(empty(Method::GET, path, Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = body_json(response).await;
        assert_eq!(body["id"], user.id);
        assert_eq!(body["nick"], "fay-nick");
        assert!(body.get("password_hash").is_none());
    }

    let response = app
        .send(empty(Method::GET, "/api/v1/users/me/profile", None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_rejects_bad_credentials(pool: PgPool) {
    create_user(&pool, "dave", false).await;
    let app = TestApp::new(pool);

    for body in [
        j!({ "login": "dave", "password": "wrong" }),
        j!({ "login": "ghost", "password": TEST_PASSWORD }),
    ] {
        let response = app
            .send(json(Method::POST, "/api/v1/auth/login", None, body))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_require_token(pool: PgPool) {
    let app = TestApp::new(pool);

    let response = app.send(empty(Method::GET, "/api/v1/users/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(empty(Method::GET, "/api/v1/users", Some("not-a-jwt")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_can_update_own_nick_only(pool: PgPool) {
    let erin = create_user(&pool, "erin", false).await;
    let frank = create_user(&pool, "frank", false).await;
    let app = TestApp::new(pool);
    let token = token_for(&erin);

    let response = app
        .send(json(
            Method::PUT,
            &format!("/api/v1/users/{}", erin.id),
            Some(&token),
            j!({ "nick": "Erin II" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["nick"], "Erin II");

    let response = app
        .send(json(
            Method::PUT,
            &format!("/api/v1/users/{}", frank.id),
            Some(&token),
            j!({ "nick": "hijacked" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json(
            Method::PUT,
            &format!("/api/v1/users/{}", erin.id),
            Some(&token),
            j!({ "is_admin": true }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_can_promote_and_delete(pool: PgPool) {
    let admin = create_user(&pool, "root", true).await;
    let gina = create_user(&pool, "gina", false).await;
    let app = TestApp::new(pool);
    let token = token_for(&admin);
    let uri = format!("/api/v1/users/{}", gina.id);

    let response = app
        .send(json(Method::PUT, &uri, Some(&token), j!({ "is_admin": true })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_admin"], true);

    let response = app.send(empty(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(empty(Method::GET, &uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admin_cannot_delete_users(pool: PgPool) {
    let hank = create_user(&pool, "hank", false).await;
    let app = TestApp::new(pool);

    let response = app
        .send(empty(
            Method::DELETE,
            &format!("/api/v1/users/{}", hank.id),
            Some(&token_for(&hank)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_users_pages(pool: PgPool) {
    let first = create_user(&pool, "u1", false).await;
    create_user(&pool, "u2", false).await;
    create_user(&pool, "u3", false).await;
    let app = TestApp::new(pool);
    let token = token_for(&first);

    let response = app
        .send(empty(Method::GET, "/api/v1/users?skip=1&limit=1", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["login"], "u2");
}
