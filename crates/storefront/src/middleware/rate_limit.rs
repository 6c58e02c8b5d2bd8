//! Rate limiting for form submissions using governor and `tower_governor`.
//!
//! Only `POST` endpoints that write to the record store are limited; page
//! views are not.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Seconds to replenish one submission.
const FORM_REPLENISH_SECS: u64 = 6;
/// Submissions allowed back to back.
const FORM_BURST: u32 = 5;

/// Key extractor for the client IP.
///
/// Order: `CF-Connecting-IP`, first hop of `X-Forwarded-For`, `X-Real-IP`,
/// the socket peer address. Requests with none of these (in-process tests)
/// share the unspecified address as their key.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let ip = header_ip(req, "cf-connecting-ip")
            .or_else(|| header_ip(req, "x-forwarded-for"))
            .or_else(|| header_ip(req, "x-real-ip"))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Ok(ip)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// The limiter configuration was rejected by governor.
#[derive(Debug, thiserror::Error)]
#[error("invalid rate limiter configuration")]
pub struct RateLimitError;

/// Create rate limiter for form posts: ~10 per minute per IP, burst of 5.
///
/// # Errors
///
/// Returns an error if governor rejects the quota.
pub fn form_rate_limiter() -> Result<RateLimiterLayer, RateLimitError> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(FORM_REPLENISH_SECS)
        .burst_size(FORM_BURST)
        .finish()
        .ok_or(RateLimitError)?;
    Ok(GovernorLayer::new(Arc::new(config)))
}
