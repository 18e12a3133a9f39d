use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use super::ApiState;
use super::handlers::{self, airports, cities, countries, upload};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Transport limits applied to every route.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}

fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(handlers::openapi_json))
        .route(
            "/country",
            post(countries::create_country).get(countries::list_countries),
        )
        .route(
            "/country/{id}",
            get(countries::get_country)
                .put(countries::update_country)
                .delete(countries::delete_country),
        )
        .route("/city", post(cities::create_city).get(cities::list_cities))
        .route(
            "/city/{id}",
            get(cities::get_city)
                .put(cities::update_city)
                .delete(cities::delete_city),
        )
        .route(
            "/airport",
            post(airports::create_airport).get(airports::list_airports),
        )
        .route(
            "/airport/{id}",
            get(airports::get_airport)
                .put(airports::update_airport)
                .delete(airports::delete_airport),
        )
        .route("/upload", post(upload::upload_cities))
        .route("/upload/airport", post(upload::upload_airports))
        .route("/upload/{table_slug}", post(upload::upload_table))
}

/// Build the full HTTP router with its middleware stack.
///
/// Runtime order (outermost first): `SetRequestId` → `PropagateRequestId` →
/// Trace → Timeout → `BodyLimit` → Router.
pub fn build_router(state: ApiState, limits: HttpLimits) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    api_routes()
        .with_state(state)
        .layer(DefaultBodyLimit::max(limits.body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            limits.request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<axum::body::Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &Response<axum::body::Body>, latency: Duration, span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                ),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}
