#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use arstudio_api::background::marker_worker::{self, MarkerQueue};
use arstudio_api::config::ServerConfig;
use arstudio_api::router::build_app_router;
use arstudio_api::state::AppState;
use arstudio_core::markers::{MarkerToolConfig, MarkerToolVariant, INPUT_PLACEHOLDER};
use arstudio_core::storage::MediaStorage;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower::ServiceExt;

/// Test stand-in for the marker creator: writes the NFT trio next to the input.
const FAKE_NFT_TOOL: &str = r#"for e in fset fset3 iset; do : > "${1%.*}.$e"; done"#;

const BOUNDARY: &str = "arstudio-test-boundary";

/// A marker tool that succeeds and produces NFT descriptor files.
pub fn fake_marker_tool() -> MarkerToolConfig {
    shell_marker_tool(FAKE_NFT_TOOL)
}

/// A marker tool that runs `script` with the image path as `$1`.
pub fn shell_marker_tool(script: &str) -> MarkerToolConfig {
    MarkerToolConfig {
        program: "sh".into(),
        args: vec![
            "-c".into(),
            script.into(),
            "sh".into(),
            INPUT_PLACEHOLDER.into(),
        ],
        variant: MarkerToolVariant::Nft,
        timeout: Duration::from_secs(10),
    }
}

/// Build a test `ServerConfig` rooted at `media_root`.
pub fn test_config(media_root: &std::path::Path, marker_tool: MarkerToolConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        media_root: media_root.to_path_buf(),
        media_url: "/media/".to_string(),
        public_base_url: "http://ar.test".to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
        marker_tool,
    }
}

/// A running application: router, its temporary media root and marker worker.
pub struct TestApp {
    pub app: Router,
    pub media: TempDir,
    _worker: DropGuard,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn media_path(&self, relative: &str) -> std::path::PathBuf {
        self.media.path().join(relative)
    }
}

/// Build the full application with the fake marker tool.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with_tool(pool, fake_marker_tool())
}

/// Build the full application router with all middleware layers and a live
/// marker worker, using the given database pool.
pub fn build_test_app_with_tool(pool: PgPool, marker_tool: MarkerToolConfig) -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let config = test_config(media.path(), marker_tool);
    let storage = MediaStorage::new(media.path());

    let (marker_queue, jobs) = MarkerQueue::channel();
    let cancel = CancellationToken::new();
    tokio::spawn(marker_worker::run(
        pool.clone(),
        storage.clone(),
        Arc::new(config.marker_tool.clone()),
        jobs,
        cancel.clone(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        marker_queue,
    };

    TestApp {
        app: build_app_router(state, &config),
        media,
        _worker: cancel.drop_guard(),
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

/// POST with no body at all.
pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    parts: &[Part<'_>],
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Upload a target and return its JSON.
pub async fn create_target(app: Router, name: &str) -> serde_json::Value {
    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/targets",
        &[
            Part::Text("name", name),
            Part::File("image", &format!("{name}.png"), b"\x89PNG fake image"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Upload an asset of `size` bytes and return its JSON.
pub async fn create_asset(app: Router, name: &str, asset_type: &str, size: usize) -> serde_json::Value {
    let data = vec![7u8; size];
    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/assets",
        &[
            Part::Text("name", name),
            Part::Text("type", asset_type),
            Part::File("file", &format!("{name}.bin"), &data),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

pub async fn create_experience(app: Router, name: &str) -> serde_json::Value {
    let response = post_json(app, "/api/v1/experiences", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Poll the marker endpoint until generation leaves `pending`/`processing`.
pub async fn wait_for_marker(app: Router, target_id: i64) -> serde_json::Value {
    for _ in 0..100 {
        let json = body_json(get(app.clone(), &format!("/api/v1/targets/{target_id}/marker")).await).await;
        let status = json["marker_status"].as_str().unwrap_or_default().to_string();
        if status == "ready" || status == "failed" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("marker generation for target {target_id} did not finish");
}
