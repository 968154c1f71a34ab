//! Session middleware
//!
//! Extracts the access/refresh cookie pair, runs the rotation state
//! machine and injects the authenticated user into request extensions.
//! When the pair was rotated, both replacement cookies ride on the same
//! response.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::auth::session::SessionOutcome;
use crate::management::server::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Where rejected sessions are sent to re-authenticate.
const LOGIN_LOCATION: &str = "/public/login";

/// Authenticated user context injected for downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: i64,
}

/// Axum session middleware.
pub async fn session_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(access_token) = cookie_value(&request, ACCESS_COOKIE) else {
        return Redirect::to(LOGIN_LOCATION).into_response();
    };
    let Some(refresh_token) = cookie_value(&request, REFRESH_COOKIE) else {
        return Redirect::to(LOGIN_LOCATION).into_response();
    };

    match state.rotator.evaluate(&access_token, &refresh_token) {
        Ok(SessionOutcome::Authenticated(claims)) => {
            request.extensions_mut().insert(Arc::new(AuthContext {
                user_id: claims.id,
                role: claims.role,
            }));
            next.run(request).await
        }
        Ok(SessionOutcome::Rotated {
            claims,
            access_token,
            refresh_token,
        }) => {
            request.extensions_mut().insert(Arc::new(AuthContext {
                user_id: claims.id,
                role: claims.role,
            }));
            let mut response = next.run(request).await;
            append_session_cookie(&mut response, ACCESS_COOKIE, &access_token);
            append_session_cookie(&mut response, REFRESH_COOKIE, &refresh_token);
            response
        }
        Ok(SessionOutcome::Rejected) => Redirect::to(LOGIN_LOCATION).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Session cookie attributes per the external contract.
#[must_use]
pub fn session_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}; Path=/; HttpOnly; Secure; SameSite=Strict")
}

fn append_session_cookie(response: &mut Response, name: &str, value: &str) {
    if let Ok(header_value) = HeaderValue::from_str(&session_cookie(name, value)) {
        response
            .headers_mut()
            .append(header::SET_COOKIE, header_value);
    }
}

fn cookie_value(request: &Request, name: &str) -> Option<String> {
    let raw = request.headers().get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_cookies(value: &str) -> Request {
        Request::builder()
            .header(header::COOKIE, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn extracts_named_cookie() {
        let request = request_with_cookies("access_token=abc; refresh_token=def");
        assert_eq!(cookie_value(&request, ACCESS_COOKIE).as_deref(), Some("abc"));
        assert_eq!(cookie_value(&request, REFRESH_COOKIE).as_deref(), Some("def"));
        assert_eq!(cookie_value(&request, "other"), None);
    }

    #[test]
    fn cookie_attributes_are_strict() {
        let cookie = session_cookie(ACCESS_COOKIE, "tok");
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }
}
