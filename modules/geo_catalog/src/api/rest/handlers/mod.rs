use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::debug;
use uuid::Uuid;

use super::dto::{HealthDto, ListQuery};
use super::error::{ApiResult, ProblemExt};
use super::validation::parse_v4_id;
use crate::domain::model::ListRequest;

pub mod airports;
pub mod cities;
pub mod countries;
pub mod upload;

/// Validate a raw `{id}` path segment.
fn path_id(raw: &str, uri: &Uri) -> ApiResult<Uuid> {
    parse_v4_id(raw).or_problem(uri)
}

fn list_request(
    query: Result<Query<ListQuery>, QueryRejection>,
    uri: &Uri,
) -> ApiResult<ListRequest> {
    let Query(q) = query.or_problem(uri)?;
    Ok(q.into())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>, uri: &Uri) -> ApiResult<T> {
    let Json(v) = body.or_problem(uri)?;
    Ok(v)
}

fn created<T: serde::Serialize>(dto: T) -> Response {
    (StatusCode::CREATED, Json(dto)).into_response()
}

fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Liveness check.
#[allow(clippy::unused_async)]
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is up", body = HealthDto))
)]
pub async fn health() -> Json<HealthDto> {
    debug!("Health check");
    Json(HealthDto {
        status: "ok".to_owned(),
    })
}

#[allow(clippy::unused_async)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    debug!("Serving OpenAPI document");
    Json(super::openapi::document())
}
