use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::response::Response;
use tracing::info;

use super::{created, json_body, list_request, no_content, path_id};
use crate::api::rest::ApiState;
use crate::api::rest::dto::{CityDto, CityListDto, CityReq, ListQuery};
use crate::api::rest::error::{ApiResult, Problem, ProblemExt};

#[utoipa::path(
    post,
    path = "/city",
    tag = "City",
    request_body = CityReq,
    responses(
        (status = 201, description = "City created", body = CityDto),
        (status = 400, description = "Malformed body", body = Problem),
        (status = 500, description = "Store failure", body = Problem)
    )
)]
pub async fn create_city(
    State(state): State<ApiState>,
    uri: Uri,
    body: Result<Json<CityReq>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body, &uri)?;
    info!(title = %req.title, country_id = ?req.country_id, "Creating new city");

    let city = state
        .storage
        .city()
        .create(req.into())
        .await
        .or_problem(&uri)?;
    Ok(created(CityDto::from(city)))
}

#[utoipa::path(
    get,
    path = "/city/{id}",
    tag = "City",
    params(("id" = String, Path, description = "City id (UUID v4)")),
    responses(
        (status = 200, description = "City found", body = CityDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "No such city", body = Problem)
    )
)]
pub async fn get_city(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<CityDto>> {
    let id = path_id(&id, &uri)?;
    let city = state.storage.city().get_by_id(id).await.or_problem(&uri)?;
    Ok(Json(city.into()))
}

#[utoipa::path(
    get,
    path = "/city",
    tag = "City",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of cities", body = CityListDto),
        (status = 400, description = "Malformed query", body = Problem)
    )
)]
pub async fn list_cities(
    State(state): State<ApiState>,
    uri: Uri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<CityListDto>> {
    let req = list_request(query, &uri)?;
    let page = state.storage.city().get_list(req).await.or_problem(&uri)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    put,
    path = "/city/{id}",
    tag = "City",
    params(("id" = String, Path, description = "City id (UUID v4)")),
    request_body = CityReq,
    responses(
        (status = 200, description = "City updated", body = CityDto),
        (status = 400, description = "Malformed id or body", body = Problem),
        (status = 404, description = "No such city", body = Problem)
    )
)]
pub async fn update_city(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
    body: Result<Json<CityReq>, JsonRejection>,
) -> ApiResult<Json<CityDto>> {
    let id = path_id(&id, &uri)?;
    let req = json_body(body, &uri)?;
    info!(city_id = %id, "Updating city");

    let city = state
        .storage
        .city()
        .update(id, req.into())
        .await
        .or_problem(&uri)?;
    Ok(Json(city.into()))
}

#[utoipa::path(
    delete,
    path = "/city/{id}",
    tag = "City",
    params(("id" = String, Path, description = "City id (UUID v4)")),
    responses(
        (status = 204, description = "City deleted"),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "No such city", body = Problem)
    )
)]
pub async fn delete_city(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = path_id(&id, &uri)?;
    info!(city_id = %id, "Deleting city");

    state.storage.city().delete(id).await.or_problem(&uri)?;
    Ok(no_content())
}
