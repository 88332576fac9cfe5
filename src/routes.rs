//! Route definitions and router setup
//!
//! Translates real HTTP requests into `ApiEvent`s for the dispatcher and
//! `ApiResponse`s back into HTTP. CORS headers come from the dispatcher, so
//! there is no CORS layer here.

use crate::error::{bad_request, AppError};
use crate::event::{ApiEvent, ApiResponse};
use crate::router::dispatch;
use crate::state::SharedState;
use axum::{
    body::{Body, Bytes},
    extract::{RawQuery, State},
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{warn, Level};

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState) -> Router {
    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Single-function endpoint
        .route("/", any(handle_http))
        .route("/api", any(handle_http))
        // Raw event invocation
        .route("/invoke", post(invoke))
        .layer(middleware)
        .with_state(state)
}

/// ANY / and ANY /api
async fn handle_http(
    State(state): State<SharedState>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<ApiResponse, AppError> {
    // Pre-flight must not depend on the body being decodable
    if method == Method::OPTIONS {
        return Ok(ApiResponse::preflight());
    }

    let event = event_from_http(&method, query.as_deref(), &body)?;
    Ok(dispatch(&event, &state).await)
}

/// POST /invoke
///
/// Body is an `ApiEvent`; reply is the `ApiResponse` as JSON.
async fn invoke(State(state): State<SharedState>, body: Bytes) -> Result<Json<ApiResponse>, AppError> {
    let event: ApiEvent = serde_json::from_slice(&body)
        .map_err(|e| bad_request(format!("Invalid invocation event: {}", e)))?;
    Ok(Json(dispatch(&event, &state).await))
}

fn event_from_http(method: &Method, query: Option<&str>, body: &[u8]) -> Result<ApiEvent, AppError> {
    let query_string_parameters = query.filter(|q| !q.is_empty()).map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect::<HashMap<String, String>>()
    });

    let body = if body.is_empty() {
        None
    } else {
        Some(
            String::from_utf8(body.to_vec())
                .map_err(|_| bad_request("Request body is not valid UTF-8"))?,
        )
    };

    Ok(ApiEvent {
        http_method: method.as_str().to_string(),
        query_string_parameters,
        body,
    })
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "Dropping invalid response header"),
            }
        }

        response
    }
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
