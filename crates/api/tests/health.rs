//! Integration tests for the health and fallback routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database_and_media(pool: PgPool) {
    let test = build_test_app(pool);
    let response = get(test.router(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["media_writable"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_carry_request_id(pool: PgPool) {
    let test = build_test_app(pool);
    let response = get(test.router(), "/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let test = build_test_app(pool);
    let response = get(test.router(), "/api/v1/nonexistent").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
