//! Integration tests for `/api/v1/experiences` and `/api/v1/exp-assets`.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_asset, create_experience, create_target, delete, get,
    patch_json, post_json, put_json,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn slugs_are_unique_per_name(pool: PgPool) {
    let test = build_test_app(pool);

    let first = create_experience(test.router(), "Museum Tour").await;
    let second = create_experience(test.router(), "Museum Tour").await;
    let third = create_experience(test.router(), "museum   tour!").await;

    assert_eq!(first["slug"], "museum-tour");
    assert_eq!(second["slug"], "museum-tour-1");
    assert_eq!(third["slug"], "museum-tour-2");
    assert_eq!(first["is_published"], false);
    assert_eq!(first["views"], 0);
    assert_eq!(first["config"]["marker_type"], "pattern");

    let accented = create_experience(test.router(), "Café Olé").await;
    assert_eq!(accented["slug"], "cafe-ole");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_name_is_rejected(pool: PgPool) {
    let test = build_test_app(pool);

    let response = post_json(test.router(), "/api/v1/experiences", json!({ "name": "" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_target_is_an_invalid_reference(pool: PgPool) {
    let test = build_test_app(pool);

    let response = post_json(
        test.router(),
        "/api/v1/experiences",
        json!({ "name": "Broken", "targets": [999_999] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REFERENCE");

    let list = body_json(get(test.router(), "/api/v1/experiences").await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_replaces_targets_and_keeps_slug(pool: PgPool) {
    let test = build_test_app(pool);
    let a = create_target(test.router(), "a").await;
    let b = create_target(test.router(), "b").await;
    let experience = create_experience(test.router(), "Launch").await;
    let id = experience["id"].as_i64().unwrap();

    let response = put_json(
        test.router(),
        &format!("/api/v1/experiences/{id}"),
        json!({ "name": "Launch Night", "targets": [b["id"], a["id"]] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Launch Night");
    assert_eq!(updated["slug"], "launch");
    assert_eq!(updated["targets"], json!([a["id"], b["id"]]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn config_is_saved_and_validated(pool: PgPool) {
    let test = build_test_app(pool);
    let experience = create_experience(test.router(), "Config").await;
    let id = experience["id"].as_i64().unwrap();
    let uri = format!("/api/v1/experiences/{id}/config");

    let response = patch_json(
        test.router(),
        &uri,
        json!({ "config_json": { "marker_type": "nft", "objects": [3, 1] } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "config saved");

    let stored = body_json(get(test.router(), &format!("/api/v1/experiences/{id}")).await).await;
    assert_eq!(stored["config"]["marker_type"], "nft");
    assert_eq!(stored["config"]["objects"], json!([3, 1]));
    assert_eq!(stored["config"]["show_detection_overlay"], false);

    let response = patch_json(
        test.router(),
        &uri,
        json!({ "config_json": { "marker_type": "nft", "sparkles": true } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json(
        test.router(),
        "/api/v1/experiences/424242/config",
        json!({ "config_json": {} }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_experience_returns_204_then_404(pool: PgPool) {
    let test = build_test_app(pool);
    let experience = create_experience(test.router(), "Temp").await;
    let uri = format!("/api/v1/experiences/{}", experience["id"]);

    assert_eq!(delete(test.router(), &uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(test.router(), &uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bindings_are_created_and_filtered(pool: PgPool) {
    let test = build_test_app(pool);
    let target = create_target(test.router(), "wall").await;
    let asset = create_asset(test.router(), "mural", "video", 64).await;
    let first = create_experience(test.router(), "First").await;
    let second = create_experience(test.router(), "Second").await;

    let response = post_json(
        test.router(),
        "/api/v1/exp-assets",
        json!({
            "experience": first["id"],
            "asset": asset["id"],
            "target": target["id"],
            "transform": { "pos": [0.0, 0.5, 0.0], "rot": [0.0, 90.0, 0.0], "scale": [2.0, 2.0, 2.0] },
            "autoplay": true,
            "loop": true
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let binding = body_json(response).await;
    assert_eq!(binding["loop"], true);
    assert_eq!(binding["face_user"], false);
    assert_eq!(binding["transform"]["rot"], json!([0.0, 90.0, 0.0]));

    let response = post_json(
        test.router(),
        "/api/v1/exp-assets",
        json!({ "experience": second["id"], "asset": asset["id"], "target": target["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["transform"]["scale"], json!([1.0, 1.0, 1.0]));

    let filtered = body_json(
        get(
            test.router(),
            &format!("/api/v1/exp-assets?experience_id={}", first["id"]),
        )
        .await,
    )
    .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["id"], binding["id"]);

    let response = put_json(
        test.router(),
        &format!("/api/v1/exp-assets/{}", binding["id"]),
        json!({ "face_user": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["face_user"], true);
    assert_eq!(updated["autoplay"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn zero_scale_transform_is_rejected(pool: PgPool) {
    let test = build_test_app(pool);
    let target = create_target(test.router(), "floor").await;
    let asset = create_asset(test.router(), "rug", "image", 8).await;
    let experience = create_experience(test.router(), "Flat").await;

    let response = post_json(
        test.router(),
        "/api/v1/exp-assets",
        json!({
            "experience": experience["id"],
            "asset": asset["id"],
            "target": target["id"],
            "transform": { "scale": [1.0, 0.0, 1.0] }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let list = body_json(get(test.router(), "/api/v1/exp-assets").await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn binding_to_missing_asset_is_an_invalid_reference(pool: PgPool) {
    let test = build_test_app(pool);
    let target = create_target(test.router(), "door").await;
    let experience = create_experience(test.router(), "Entrance").await;

    let response = post_json(
        test.router(),
        "/api/v1/exp-assets",
        json!({ "experience": experience["id"], "asset": 777, "target": target["id"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REFERENCE");
}
