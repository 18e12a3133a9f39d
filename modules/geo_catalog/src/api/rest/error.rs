//! RFC 9457 problem documents and the mapping from domain errors.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::domain::error::DomainError;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

pub type ApiResult<T> = Result<T, Problem>;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

/// RFC 9457 Problem Details for HTTP APIs.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(title = "Problem", description = "RFC 9457 Problem Details for HTTP APIs")]
#[must_use]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    pub detail: String,
    /// The request path this problem occurred on.
    pub instance: String,
    /// Machine-readable error code.
    pub code: String,
    pub trace_id: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
        }
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    /// Sets `code` and derives the `type` URI from it.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self.type_url = format!("urn:geo-catalog:problem:{}", self.code);
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn bad_request(code: &str, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", detail)
            .with_code(code)
            .with_current_trace()
    }

    fn with_current_trace(self) -> Self {
        match tracing::Span::current().id() {
            Some(id) => self.with_trace_id(id.into_u64().to_string()),
            None => self,
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Map domain error to RFC 9457 Problem.
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let (status, code, title, detail) = match e {
        DomainError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            "GEO_NOT_FOUND",
            "Not Found",
            e.to_string(),
        ),
        DomainError::Validation { .. } => (
            StatusCode::BAD_REQUEST,
            "GEO_VALIDATION",
            "Bad Request",
            e.to_string(),
        ),
        DomainError::InvalidImportFile { .. } => (
            StatusCode::BAD_REQUEST,
            "GEO_IMPORT_INVALID_FILE",
            "Bad Request",
            e.to_string(),
        ),
        DomainError::PartialFailure { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "GEO_IMPORT_ROLLED_BACK",
            "Unprocessable Entity",
            e.to_string(),
        ),
        DomainError::Timeout { .. } => (
            StatusCode::GATEWAY_TIMEOUT,
            "GEO_TIMEOUT",
            "Gateway Timeout",
            e.to_string(),
        ),
        DomainError::ImportIo { .. } => {
            tracing::error!(error = %e, "Import file could not be read");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GEO_IMPORT_IO",
                "Internal Server Error",
                "The uploaded file could not be read".to_owned(),
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Database error occurred");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GEO_INTERNAL",
                "Internal Server Error",
                "An internal database error occurred".to_owned(),
            )
        }
    };

    Problem::new(status, title, detail)
        .with_code(code)
        .with_instance(instance)
        .with_current_trace()
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "")
    }
}

impl From<JsonRejection> for Problem {
    fn from(r: JsonRejection) -> Self {
        Problem::bad_request("GEO_INVALID_BODY", r.body_text())
    }
}

impl From<QueryRejection> for Problem {
    fn from(r: QueryRejection) -> Self {
        Problem::bad_request("GEO_INVALID_QUERY", r.body_text())
    }
}

impl From<MultipartRejection> for Problem {
    fn from(r: MultipartRejection) -> Self {
        Problem::bad_request("GEO_INVALID_UPLOAD", r.body_text())
    }
}

impl From<MultipartError> for Problem {
    fn from(e: MultipartError) -> Self {
        Problem::bad_request("GEO_INVALID_UPLOAD", e.body_text())
    }
}

/// Render any failure that converts into a [`Problem`] with the request path
/// as its `instance`.
pub trait ProblemExt<T> {
    /// # Errors
    /// The failure rendered as a [`Problem`] for `uri`.
    fn or_problem(self, uri: &Uri) -> ApiResult<T>;
}

impl<T, E> ProblemExt<T> for Result<T, E>
where
    E: Into<Problem>,
{
    fn or_problem(self, uri: &Uri) -> ApiResult<T> {
        self.map_err(|e| e.into().with_instance(uri.path()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::not_found("City", Uuid::nil()), 404),
            (DomainError::validation("id", "not a uuid"), 400),
            (DomainError::invalid_import_file("expected array"), 400),
            (DomainError::partial_failure(2, "duplicate key"), 422),
            (DomainError::timeout("import"), 504),
            (DomainError::import_io("/tmp/x.json", "gone"), 500),
            (DomainError::database("boom"), 500),
        ];
        for (err, status) in cases {
            let p = domain_error_to_problem(&err, "/city");
            assert_eq!(p.status.as_u16(), status, "{err}");
            assert_eq!(p.instance, "/city");
            assert!(p.type_url.ends_with(&p.code));
        }
    }

    #[test]
    fn database_details_are_not_exposed() {
        let p = domain_error_to_problem(&DomainError::database("password=hunter2"), "/");
        assert!(!p.detail.contains("hunter2"));
    }

    #[test]
    fn partial_failure_names_the_record() {
        let p = domain_error_to_problem(&DomainError::partial_failure(7, "x"), "/upload");
        assert!(p.detail.contains("#7"));
    }

    #[test]
    fn serializes_status_as_number() {
        let p = Problem::new(StatusCode::NOT_FOUND, "Not Found", "missing");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["type"], "about:blank");
    }

    #[test]
    fn rejections_carry_the_request_path() {
        let uri: Uri = "/city/abc?x=1".parse().unwrap();
        let res: Result<(), DomainError> = Err(DomainError::validation("id", "bad"));
        let p = res.or_problem(&uri).unwrap_err();
        assert_eq!(p.instance, "/city/abc");
        assert_eq!(p.code, "GEO_VALIDATION");

        let res: Result<(), Problem> = Err(Problem::bad_request("GEO_INVALID_BODY", "eof"));
        assert_eq!(res.or_problem(&uri).unwrap_err().instance, "/city/abc");
    }

    #[test]
    fn response_has_problem_content_type() {
        let resp = Problem::bad_request("GEO_VALIDATION", "nope").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
    }
}
