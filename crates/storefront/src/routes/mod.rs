//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (pings the record store)
//!
//! # Catalog
//! GET  /shop                   - Filtered catalog (?category=&age=&color=)
//! GET  /products/{id}          - Product detail (?color=)
//! GET  /api/catalog            - Filtered catalog as JSON
//!
//! # Content
//! GET  /pages/{slug}           - Markdown policy pages
//! GET  /contact                - Contact form
//! POST /contact                - Submit contact form (rate limited)
//!
//! # Checkout (only when a payment key is configured)
//! GET  /checkout/{product_id}              - Buyer details form
//! POST /checkout/{product_id}              - Start attempt (rate limited)
//! GET  /checkout/attempts/{attempt_id}     - Result page
//! POST /api/checkout/{attempt_id}/complete - Provider outcome
//! ```

pub mod api;
pub mod checkout;
pub mod contact;
pub mod health;
pub mod home;
pub mod pages;
pub mod products;
pub mod shop;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes(form_limiter: RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route(
            "/{product_id}",
            get(checkout::show).merge(post(checkout::start).layer(form_limiter)),
        )
        .route("/attempts/{attempt_id}", get(checkout::result))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(api::catalog::index))
        .route("/checkout/{attempt_id}/complete", post(checkout::complete))
}

/// Create all routes for the storefront.
///
/// Form posts share one rate limiter per client IP.
pub fn routes(form_limiter: &RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/shop", get(shop::index))
        .route("/products/{id}", get(products::show))
        .route("/pages/{slug}", get(pages::show))
        .route(
            "/contact",
            get(contact::show).merge(post(contact::submit).layer(form_limiter.clone())),
        )
        .nest("/checkout", checkout_routes(form_limiter.clone()))
        .nest("/api", api_routes())
}
