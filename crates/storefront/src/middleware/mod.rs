//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (record on span and Sentry scope, echo in response)
//! 4. Security headers (CSP, framing, referrer)
//! 5. Rate limiting on form posts only (governor)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::{RateLimitError, RateLimiterLayer, form_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
