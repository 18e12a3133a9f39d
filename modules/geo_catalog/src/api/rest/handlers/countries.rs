use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::response::Response;
use tracing::info;

use super::{created, json_body, list_request, no_content, path_id};
use crate::api::rest::ApiState;
use crate::api::rest::dto::{CountryDto, CountryListDto, CountryReq, ListQuery};
use crate::api::rest::error::{ApiResult, Problem, ProblemExt};

#[utoipa::path(
    post,
    path = "/country",
    tag = "Country",
    request_body = CountryReq,
    responses(
        (status = 201, description = "Country created", body = CountryDto),
        (status = 400, description = "Malformed body", body = Problem),
        (status = 500, description = "Store failure", body = Problem)
    )
)]
pub async fn create_country(
    State(state): State<ApiState>,
    uri: Uri,
    body: Result<Json<CountryReq>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body, &uri)?;
    info!(title = %req.title, code = %req.code, "Creating new country");

    let country = state
        .storage
        .country()
        .create(req.into())
        .await
        .or_problem(&uri)?;
    Ok(created(CountryDto::from(country)))
}

#[utoipa::path(
    get,
    path = "/country/{id}",
    tag = "Country",
    params(("id" = String, Path, description = "Country id (UUID v4)")),
    responses(
        (status = 200, description = "Country found", body = CountryDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "No such country", body = Problem)
    )
)]
pub async fn get_country(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<CountryDto>> {
    let id = path_id(&id, &uri)?;
    let country = state.storage.country().get_by_id(id).await.or_problem(&uri)?;
    Ok(Json(country.into()))
}

#[utoipa::path(
    get,
    path = "/country",
    tag = "Country",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of countries", body = CountryListDto),
        (status = 400, description = "Malformed query", body = Problem)
    )
)]
pub async fn list_countries(
    State(state): State<ApiState>,
    uri: Uri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<CountryListDto>> {
    let req = list_request(query, &uri)?;
    let page = state.storage.country().get_list(req).await.or_problem(&uri)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    put,
    path = "/country/{id}",
    tag = "Country",
    params(("id" = String, Path, description = "Country id (UUID v4)")),
    request_body = CountryReq,
    responses(
        (status = 200, description = "Country updated", body = CountryDto),
        (status = 400, description = "Malformed id or body", body = Problem),
        (status = 404, description = "No such country", body = Problem)
    )
)]
pub async fn update_country(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
    body: Result<Json<CountryReq>, JsonRejection>,
) -> ApiResult<Json<CountryDto>> {
    let id = path_id(&id, &uri)?;
    let req = json_body(body, &uri)?;
    info!(country_id = %id, "Updating country");

    let country = state
        .storage
        .country()
        .update(id, req.into())
        .await
        .or_problem(&uri)?;
    Ok(Json(country.into()))
}

#[utoipa::path(
    delete,
    path = "/country/{id}",
    tag = "Country",
    params(("id" = String, Path, description = "Country id (UUID v4)")),
    responses(
        (status = 204, description = "Country deleted"),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "No such country", body = Problem)
    )
)]
pub async fn delete_country(
    State(state): State<ApiState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = path_id(&id, &uri)?;
    info!(country_id = %id, "Deleting country");

    state.storage.country().delete(id).await.or_problem(&uri)?;
    Ok(no_content())
}
