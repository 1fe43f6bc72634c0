//! Shared helpers for API integration tests.
//!
//! Builds the real application router (same middleware stack as `main.rs`)
//! on top of a per-test database pool and temporary upload directory, and
//! provides small request/response helpers around `tower::ServiceExt`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use qm_api::config::ServerConfig;
use qm_api::router::build_app_router;
use qm_api::state::AppState;

/// Build a test `ServerConfig` over the given upload directory.
pub fn test_config(upload_dir: &std::path::Path, max_upload_bytes: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes,
    }
}

/// Build the full application router with all middleware layers.
///
/// Returns the temp upload dir alongside the router; keep it in scope for
/// the duration of the test.
pub fn build_test_app(pool: PgPool) -> (Router, TempDir) {
    build_test_app_with_max_upload(pool, 10 * 1024 * 1024)
}

/// Same as [`build_test_app`] with a custom upload size cap.
pub fn build_test_app_with_max_upload(pool: PgPool, max_upload_bytes: usize) -> (Router, TempDir) {
    let upload_dir = TempDir::new().expect("temp upload dir");
    let config = test_config(upload_dir.path(), max_upload_bytes);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    (build_app_router(state, &config), upload_dir)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "POST", uri, body).await
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "PATCH", uri, body).await
}

pub async fn delete_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "DELETE", uri, body).await
}

async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// POST a single file as a `multipart/form-data` `file` part.
pub async fn post_file(
    app: &Router,
    uri: &str,
    filename: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "test-boundary-7349";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Spreadsheet fixtures
// ---------------------------------------------------------------------------

/// Build an in-memory `.xlsx` workbook with one header row plus data rows.
/// Empty strings become blank cells.
pub fn xlsx_bytes(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (row, cells) in rows.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string((row + 1) as u32, col as u16, *value).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}
