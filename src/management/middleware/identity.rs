//! Perimeter identity check
//!
//! Public endpoints are reachable only through the trusted frontend: the
//! request must carry the external identity header and the shared
//! perimeter secret. This is a perimeter precondition, not part of the
//! credential core.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::error::GatewayError;
use crate::management::server::AppState;

pub const CLERK_ID_HEADER: &str = "clerkID";
pub const PERIMETER_SECRET_HEADER: &str = "secret_key";

/// External identity extracted at the perimeter.
#[derive(Debug, Clone)]
pub struct ClerkIdentity(pub String);

/// Axum perimeter middleware.
pub async fn perimeter_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(clerk_id) = header_string(&request, CLERK_ID_HEADER) else {
        return GatewayError::unauthorized("missing identity header").into_response();
    };

    let Some(presented) = header_string(&request, PERIMETER_SECRET_HEADER) else {
        return GatewayError::unauthorized("missing perimeter secret header").into_response();
    };
    let expected = state.secrets.perimeter_secret().as_bytes();
    let matches: bool = expected.ct_eq(presented.as_bytes()).into();
    if !matches {
        return GatewayError::unauthorized("perimeter secret mismatch").into_response();
    }

    request.extensions_mut().insert(ClerkIdentity(clerk_id));
    next.run(request).await
}

fn header_string(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
