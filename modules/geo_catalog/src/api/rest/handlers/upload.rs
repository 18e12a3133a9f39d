//! Multipart upload endpoints feeding the bulk importers.
//!
//! The `file` part is staged under the configured upload directory with a
//! server-generated name, imported, then removed unless `keep_uploads` is set.
//! A staged file is owned by a [`TempPath`], so it is also removed when the
//! request is cancelled mid-import.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::Uri;
use tempfile::TempPath;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::rest::dto::{ImportReportDto, UploadForm};
use crate::api::rest::error::{ApiResult, Problem, ProblemExt};
use crate::api::rest::{ApiState, UploadCfg};
use crate::domain::error::DomainError;
use crate::domain::model::ImportTable;
use crate::domain::storage::import_file;

const FILE_FIELD: &str = "file";
const JSON_CONTENT_TYPE: &str = "application/json";

#[utoipa::path(
    post,
    path = "/upload",
    tag = "City",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "All records committed", body = ImportReportDto),
        (status = 400, description = "Missing or non-JSON file part", body = Problem),
        (status = 422, description = "A record failed; nothing was stored", body = Problem),
        (status = 504, description = "Import deadline expired", body = Problem)
    )
)]
pub async fn upload_cities(
    State(state): State<ApiState>,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReportDto>> {
    let multipart = multipart.or_problem(&uri)?;
    import_upload(&state, &uri, ImportTable::Cities, multipart).await
}

#[utoipa::path(
    post,
    path = "/upload/airport",
    tag = "Airport",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "All records committed", body = ImportReportDto),
        (status = 400, description = "Missing or non-JSON file part", body = Problem),
        (status = 422, description = "A record failed; nothing was stored", body = Problem),
        (status = 504, description = "Import deadline expired", body = Problem)
    )
)]
pub async fn upload_airports(
    State(state): State<ApiState>,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReportDto>> {
    let multipart = multipart.or_problem(&uri)?;
    import_upload(&state, &uri, ImportTable::Airports, multipart).await
}

#[utoipa::path(
    post,
    path = "/upload/{table_slug}",
    tag = "Country",
    params((
        "table_slug" = String,
        Path,
        description = "country/countries, city/cities or airport/airports/buildings"
    )),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "All records committed", body = ImportReportDto),
        (status = 400, description = "Unknown table or bad file part", body = Problem),
        (status = 422, description = "A record failed; nothing was stored", body = Problem),
        (status = 504, description = "Import deadline expired", body = Problem)
    )
)]
pub async fn upload_table(
    State(state): State<ApiState>,
    uri: Uri,
    Path(table_slug): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReportDto>> {
    let table = ImportTable::from_slug(&table_slug)
        .ok_or_else(|| {
            DomainError::validation("table_slug", format!("unknown table '{table_slug}'"))
        })
        .or_problem(&uri)?;
    let multipart = multipart.or_problem(&uri)?;
    import_upload(&state, &uri, table, multipart).await
}

async fn import_upload(
    state: &ApiState,
    uri: &Uri,
    table: ImportTable,
    multipart: Multipart,
) -> ApiResult<Json<ImportReportDto>> {
    let staged = stage_upload(&state.uploads, multipart, uri).await?;
    info!(?table, path = %staged.display(), "Importing uploaded file");

    let result = if state.uploads.keep {
        let path = staged
            .keep()
            .map_err(|e| DomainError::import_io("staged upload", e.to_string()))
            .or_problem(uri)?;
        import_file(state.storage.as_ref(), table, &path).await
    } else {
        let result = import_file(state.storage.as_ref(), table, &staged).await;
        let path = staged.to_path_buf();
        if let Err(e) = staged.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
        }
        result
    };

    let report = result.or_problem(uri)?;
    Ok(Json(report.into()))
}

/// Write the `file` part to disk. The file lives as long as the returned guard.
async fn stage_upload(
    cfg: &UploadCfg,
    mut multipart: Multipart,
    uri: &Uri,
) -> ApiResult<TempPath> {
    while let Some(field) = multipart.next_field().await.or_problem(uri)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !is_json_media_type(&content_type) {
            return Err(Problem::bad_request(
                "GEO_INVALID_UPLOAD",
                format!("file part must be {JSON_CONTENT_TYPE}, got '{content_type}'"),
            )
            .with_instance(uri.path()));
        }

        let bytes = field.bytes().await.or_problem(uri)?;
        return write_staged(&cfg.dir, &bytes).await.or_problem(uri);
    }

    Err(
        Problem::bad_request("GEO_INVALID_UPLOAD", "multipart field 'file' is required")
            .with_instance(uri.path()),
    )
}

/// Compare the media type essence only: parameters such as `charset` are
/// ignored and the match is case-insensitive.
fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

async fn write_staged(dir: &std::path::Path, bytes: &[u8]) -> Result<TempPath, DomainError> {
    let io_err =
        |e: std::io::Error| DomainError::import_io(dir.display().to_string(), e.to_string());
    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;

    let staged = tempfile::Builder::new()
        .prefix(&Uuid::new_v4().to_string())
        .suffix(".json")
        .rand_bytes(0)
        .tempfile_in(dir)
        .map_err(io_err)?
        .into_temp_path();
    tokio::fs::write(&staged, bytes).await.map_err(io_err)?;
    Ok(staged)
}
