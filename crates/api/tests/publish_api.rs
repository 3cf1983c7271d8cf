//! Integration tests for publishing and the live viewer.

mod common;

use arstudio_core::asset::AssetType;
use arstudio_core::markers::MarkerToolVariant;
use arstudio_db::models::asset::CreateAsset;
use arstudio_db::repositories::AssetRepo;
use axum::http::{header, StatusCode};
use common::{
    body_json, body_text, build_test_app, build_test_app_with_tool, create_asset,
    create_experience, create_target, fake_marker_tool, get, post_empty, post_json,
    wait_for_marker, TestApp,
};
use serde_json::json;
use sqlx::PgPool;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Experience with one ready target and one bound video.
async fn staged_experience(test: &TestApp) -> i64 {
    let target = create_target(test.router(), "entrance").await;
    wait_for_marker(test.router(), target["id"].as_i64().unwrap()).await;
    let asset = create_asset(test.router(), "welcome", "video", 2048).await;

    let response = post_json(
        test.router(),
        "/api/v1/experiences",
        json!({ "name": "Open Day", "targets": [target["id"]] }),
    )
    .await;
    let experience_id = body_json(response).await["id"].as_i64().unwrap();

    let response = post_json(
        test.router(),
        "/api/v1/exp-assets",
        json!({
            "experience": experience_id,
            "asset": asset["id"],
            "target": target["id"],
            "autoplay": true
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    experience_id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_writes_viewer_and_qr(pool: PgPool) {
    let test = build_test_app(pool);
    let id = staged_experience(&test).await;

    let response = post_json(
        test.router(),
        &format!("/api/v1/experiences/{id}/publish"),
        json!({ "marker_type": "nft" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["experience_id"], id);
    assert_eq!(data["viewer_url"], format!("/media/viewer_{id}.html"));
    assert_eq!(data["qr_url"], format!("/media/qr_exp_{id}.png"));
    assert_eq!(data["public_url"], format!("http://ar.test/viewer/{id}"));

    let html = std::fs::read_to_string(test.media_path(&format!("viewer_{id}.html"))).unwrap();
    assert!(html.contains("<title>Open Day</title>"));
    assert!(html.contains("/media/assets/welcome.bin"));
    assert!(html.contains("/media/targets/entrance"));

    let png = std::fs::read(test.media_path(&format!("qr_exp_{id}.png"))).unwrap();
    assert!(png.starts_with(PNG_SIGNATURE));

    let stored = body_json(get(test.router(), &format!("/api/v1/experiences/{id}")).await).await;
    assert_eq!(stored["is_published"], true);
    assert!(stored["published_at"].is_string());
    assert_eq!(stored["config"]["marker_type"], "nft");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_without_body_follows_marker_tool(pool: PgPool) {
    let test = build_test_app(pool);
    let experience = create_experience(test.router(), "Bare").await;
    let id = experience["id"].as_i64().unwrap();

    let response = post_empty(test.router(), &format!("/api/v1/experiences/{id}/publish")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = body_json(get(test.router(), &format!("/api/v1/experiences/{id}")).await).await;
    assert_eq!(stored["config"]["marker_type"], "nft");
    let html = std::fs::read_to_string(test.media_path(&format!("viewer_{id}.html"))).unwrap();
    assert!(!html.contains("type=\"pattern\""));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pattern_tool_publishes_pattern_viewer(pool: PgPool) {
    let mut tool = fake_marker_tool();
    tool.variant = MarkerToolVariant::Pattern;
    let test = build_test_app_with_tool(pool, tool);
    let experience = create_experience(test.router(), "Square").await;
    let id = experience["id"].as_i64().unwrap();

    let response = post_json(
        test.router(),
        &format!("/api/v1/experiences/{id}/publish"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = body_json(get(test.router(), &format!("/api/v1/experiences/{id}")).await).await;
    assert_eq!(stored["config"]["marker_type"], "pattern");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_publish_conflicts(pool: PgPool) {
    let test = build_test_app(pool);
    let experience = create_experience(test.router(), "Once").await;
    let uri = format!("/api/v1/experiences/{}/publish", experience["id"]);

    assert_eq!(post_empty(test.router(), &uri).await.status(), StatusCode::OK);

    let response = post_empty(test.router(), &uri).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Experience is already published"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_content_is_refused_without_side_effects(pool: PgPool) {
    let test = build_test_app(pool.clone());
    let target = create_target(test.router(), "stage").await;
    let experience = create_experience(test.router(), "Heavy").await;
    let id = experience["id"].as_i64().unwrap();

    let huge = AssetRepo::create(
        &pool,
        &CreateAsset {
            name: "feature film".into(),
            file_path: "assets/film.mp4".into(),
            asset_type: AssetType::Video,
            size_bytes: 60 * 1024 * 1024,
        },
    )
    .await
    .unwrap();
    let response = post_json(
        test.router(),
        "/api/v1/exp-assets",
        json!({ "experience": id, "asset": huge.id, "target": target["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_empty(test.router(), &format!("/api/v1/experiences/{id}/publish")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let stored = body_json(get(test.router(), &format!("/api/v1/experiences/{id}")).await).await;
    assert_eq!(stored["is_published"], false);
    assert!(!test.media_path(&format!("viewer_{id}.html")).exists());
    assert!(!test.media_path(&format!("qr_exp_{id}.png")).exists());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publishing_missing_experience_returns_404(pool: PgPool) {
    let test = build_test_app(pool);

    let response = post_empty(test.router(), "/api/v1/experiences/31337/publish").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_marker_type_is_rejected(pool: PgPool) {
    let test = build_test_app(pool);
    let experience = create_experience(test.router(), "Odd").await;

    let response = post_json(
        test.router(),
        &format!("/api/v1/experiences/{}/publish", experience["id"]),
        json!({ "marker_type": "barcode" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewer_is_hidden_until_published(pool: PgPool) {
    let test = build_test_app(pool);
    let experience = create_experience(test.router(), "Draft").await;

    let response = get(test.router(), &format!("/viewer/{}", experience["id"])).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = body_json(
        get(test.router(), &format!("/api/v1/experiences/{}", experience["id"])).await,
    )
    .await;
    assert_eq!(stored["views"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewer_serves_html_and_counts_views(pool: PgPool) {
    let test = build_test_app(pool);
    let id = staged_experience(&test).await;
    post_empty(test.router(), &format!("/api/v1/experiences/{id}/publish")).await;

    for _ in 0..2 {
        let response = get(test.router(), &format!("/viewer/{id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let html = body_text(response).await;
        assert!(html.contains("data-slug=\"open-day\""));
        assert!(html.contains("http://ar.test/api/v1/metrics"));
    }

    let stored = body_json(get(test.router(), &format!("/api/v1/experiences/{id}")).await).await;
    assert_eq!(stored["views"], 2);
}
