//! HTTP route handlers and route-table construction.
//!
//! The route table is built exactly once, before the listener starts, and is
//! never mutated afterwards: one application route (`GET /`) plus a fallback
//! that answers every other method/path with 404 Not Found.
//!
//! Request tracing is enabled via middleware that generates a unique request
//! ID for each incoming request, allowing correlation of all logs within a
//! request.

pub mod hello;

use axum::{http::StatusCode, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_layer;

/// Creates the Axum router with the full, immutable route table.
pub fn create_router() -> Router {
    Router::new()
        .route("/", get(hello::greet))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

/// Fallback for any route outside the table.
async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
