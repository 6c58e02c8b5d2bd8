//! Toyshop storefront library.
//!
//! The binary in `main.rs` only loads configuration, sets up tracing and
//! Sentry, and serves [`build_app`]. Everything else lives here so the
//! integration tests can drive the same router against an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::{Router, body::Body, http::Request};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    RateLimitError, form_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Root span for one request. `request_id` is filled in by the request ID
/// middleware.
fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

async fn not_found() -> AppError {
    AppError::NotFound("page".to_string())
}

/// Build the full storefront router with its middleware stack.
///
/// # Errors
///
/// Returns an error if the form rate limiter cannot be configured.
pub fn build_app(state: AppState) -> Result<Router, RateLimitError> {
    let form_limiter = form_rate_limiter()?;
    let static_dir = state.config().static_dir.clone();

    Ok(Router::new()
        .merge(routes::routes(&form_limiter))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}
