use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::response::Response;
use tracing::info;

use super::{created, json_body, list_request, no_content, path_id};
use crate::api::rest::ApiState;
use crate::api::rest::dto::{AirportDto, AirportListDto, AirportReq, ListQuery};
use crate::api::rest::error::{ApiResult, Problem, ProblemExt};

#[utoipa::path(
    post,
    path = "/airport",
    tag = "Airport",
    request_body = AirportReq,
    responses(
        (status = 201, description = "Airport created", body = AirportDto),
        (status = 400, description = "Malformed body", body = Problem),
        (status = 500, description = "Store failure", body = Problem)
    )
)]
pub async fn create_airport(
    State(state): State<ApiState>,
    uri: Uri,
    body: Result<Json<AirportReq>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body, &uri)?;
    info!(title = %req.title, code = %req.code, "Creating new airport");

    let airport = state
        .storage
        .airport()
        .create(req.into())
        .await
        .or_problem(&uri)?;
    Ok(created(AirportDto::from(airport)))
}

#[utoipa::path(
    get,
    path = "/airport/{id}",
    tag = "Airport",
    params(("id" = String, Path, description = "Airport id (UUID v4)")),
    responses(
        (status = 200, description = "Airport found", body = AirportDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "No such airport", body = Problem)
    )
)]
pub async fn get_airport(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<AirportDto>> {
    let id = path_id(&id, &uri)?;
    let airport = state.storage.airport().get_by_id(id).await.or_problem(&uri)?;
    Ok(Json(airport.into()))
}

#[utoipa::path(
    get,
    path = "/airport",
    tag = "Airport",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of airports", body = AirportListDto),
        (status = 400, description = "Malformed query", body = Problem)
    )
)]
pub async fn list_airports(
    State(state): State<ApiState>,
    uri: Uri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<AirportListDto>> {
    let req = list_request(query, &uri)?;
    let page = state.storage.airport().get_list(req).await.or_problem(&uri)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    put,
    path = "/airport/{id}",
    tag = "Airport",
    params(("id" = String, Path, description = "Airport id (UUID v4)")),
    request_body = AirportReq,
    responses(
        (status = 200, description = "Airport updated", body = AirportDto),
        (status = 400, description = "Malformed id or body", body = Problem),
        (status = 404, description = "No such airport", body = Problem)
    )
)]
pub async fn update_airport(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
    body: Result<Json<AirportReq>, JsonRejection>,
) -> ApiResult<Json<AirportDto>> {
    let id = path_id(&id, &uri)?;
    let req = json_body(body, &uri)?;
    info!(airport_id = %id, "Updating airport");

    let airport = state
        .storage
        .airport()
        .update(id, req.into())
        .await
        .or_problem(&uri)?;
    Ok(Json(airport.into()))
}

#[utoipa::path(
    delete,
    path = "/airport/{id}",
    tag = "Airport",
    params(("id" = String, Path, description = "Airport id (UUID v4)")),
    responses(
        (status = 204, description = "Airport deleted"),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "No such airport", body = Problem)
    )
)]
pub async fn delete_airport(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = path_id(&id, &uri)?;
    info!(airport_id = %id, "Deleting airport");

    state.storage.airport().delete(id).await.or_problem(&uri)?;
    Ok(no_content())
}
