//! The quiz service's HTTP surface: its routes and the middleware every
//! request passes through. `main.rs` and the integration tests both build
//! the app here.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// `/health` plus the versioned quiz API, wrapped in (outermost first):
/// CORS for the quiz frontend, an `x-request-id` on every request and
/// response, a tracing span per request, and the request timeout that bounds
/// generation calls.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let quiz_routes = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes());

    let request_trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    quiz_routes
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(request_trace)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(frontend_cors(&config.cors_origins))
        .with_state(state)
}

/// CORS for the quiz frontend origins. The API takes JSON bodies only and
/// carries no credentials.
///
/// Panics at startup if an origin is not a valid header value.
pub fn frontend_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
