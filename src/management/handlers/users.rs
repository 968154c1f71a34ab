//! Public account handlers: signup and session issuance

use axum::{
    Extension, Json,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::management::middleware::ClerkIdentity;
use crate::management::middleware::session::{ACCESS_COOKIE, REFRESH_COOKIE, session_cookie};
use crate::management::response::ApiResponse;
use crate::management::server::AppState;
use crate::management::services::users as user_service;

/// Signup request payload.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
}

/// Registered account view.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role: i64,
    pub confirmed: bool,
}

impl From<entity::users::Model> for UserResponse {
    fn from(user: entity::users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            confirmed: user.confirmed,
        }
    }
}

/// Login response payload; the tokens themselves travel as cookies.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub expires_in: i64,
}

/// `POST /public/signup`
pub async fn signup(
    axum::extract::State(state): axum::extract::State<AppState>,
    Extension(identity): Extension<ClerkIdentity>,
    Json(body): Json<SignupRequest>,
) -> ApiResponse<UserResponse> {
    match user_service::register(&state.db, &identity.0, &body.email).await {
        Ok(user) => ApiResponse::Created(user.into()),
        Err(err) => err.into(),
    }
}

/// `POST /public/login`
///
/// Resolves the external identity to a registered user and sets a fresh
/// access/refresh cookie pair on the response.
pub async fn login(
    axum::extract::State(state): axum::extract::State<AppState>,
    Extension(identity): Extension<ClerkIdentity>,
) -> Response {
    let user = match user_service::find_by_clerk_id(&state.db, &identity.0).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    let pair = match state
        .session_codec
        .issue_pair(user.id, user.role, &user.email)
    {
        Ok(pair) => pair,
        Err(err) => return err.into_response(),
    };

    let mut response = ApiResponse::Success(LoginResponse {
        user: user.into(),
        expires_in: pair.expires_in,
    })
    .into_response();

    for (name, token) in [
        (ACCESS_COOKIE, &pair.access_token),
        (REFRESH_COOKIE, &pair.refresh_token),
    ] {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(name, token)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
