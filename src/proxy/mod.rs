//! Capability-gated forwarding to the downstream service

pub mod cache;
pub mod forwarder;
pub mod storage;

pub use forwarder::{DownstreamClient, ForwardedResponse};

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::error::{GatewayError, Result};

/// Header programmatic clients present their key in.
pub const API_KEY_HEADER: &str = "API-Key";

/// Extract the presented API key, rejecting requests without one.
pub fn api_key_from_headers(headers: &HeaderMap) -> Result<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| GatewayError::unauthorized("missing API key in request headers"))
}

/// Pass a downstream reply through to the caller unchanged.
pub fn passthrough(forwarded: ForwardedResponse) -> Response {
    (forwarded.status, forwarded.body).into_response()
}
