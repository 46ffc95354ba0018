mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, empty, header, TestApp};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database(pool: PgPool) {
    let app = TestApp::new(pool);

    let response = app.send(empty(Method::GET, "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "x-request-id").is_some());

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_is_404(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = app.send(empty(Method::GET, "/api/v1/nope", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
