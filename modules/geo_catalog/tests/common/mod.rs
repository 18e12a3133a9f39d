#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures: a migrated in-memory database and a router on top of it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use geo_catalog::api::rest::{ApiState, HttpLimits, build_router};
use geo_catalog::infra::db::{self, DatabaseConfig};
use geo_catalog::{GeoCatalogConfig, GeoStorage, Storage};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Fresh, migrated `sqlite::memory:` storage. Every call gets its own database.
pub async fn storage_with(cfg: &GeoCatalogConfig) -> GeoStorage {
    let conn = db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("connect sqlite::memory:");
    db::run_migrations(&conn).await.expect("migrate");
    GeoStorage::with_sea_orm(conn, cfg)
}

pub async fn storage() -> GeoStorage {
    storage_with(&GeoCatalogConfig::default()).await
}

/// Router over `storage` staging uploads in `upload_dir`.
pub fn router(storage: GeoStorage, upload_dir: &Path, keep_uploads: bool) -> Router {
    let cfg = GeoCatalogConfig {
        upload_dir: upload_dir.to_path_buf(),
        keep_uploads,
        ..GeoCatalogConfig::default()
    };
    build_router(
        ApiState::new(Arc::new(storage), &cfg),
        HttpLimits::default(),
    )
}

/// Router over an arbitrary [`Storage`] with explicit HTTP limits.
pub fn router_with(storage: Arc<dyn Storage>, cfg: &GeoCatalogConfig, limits: HttpLimits) -> Router {
    build_router(ApiState::new(storage, cfg), limits)
}

/// Write `value` as a JSON import file inside `dir`.
pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    path
}

/// Send one request and return the status plus the parsed JSON body
/// (`Null` for an empty body).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub const BOUNDARY: &str = "geo-catalog-test-boundary";

/// `multipart/form-data` request carrying a single part.
pub fn multipart_request(uri: &str, field: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"../../etc/data.json\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
