//! # API response envelope
//!
//! Standard JSON shapes for success and failure. Internal error detail is
//! logged here and never serialized to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GatewayError;

/// Standard success response.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Standard error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Standard error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorInfo,
    pub timestamp: DateTime<Utc>,
}

/// Unified handler return type.
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    Success(T),
    Created(T),
    SuccessWithMessage(T, String),
    SuccessWithoutData(String),
    AppError(GatewayError),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Success(data) => success_body(StatusCode::OK, Some(data), None),
            Self::Created(data) => success_body(StatusCode::CREATED, Some(data), None),
            Self::SuccessWithMessage(data, message) => {
                success_body(StatusCode::OK, Some(data), Some(message))
            }
            Self::SuccessWithoutData(message) => {
                success_body::<T>(StatusCode::OK, None, Some(message))
            }
            Self::AppError(err) => err.into_response(),
        }
    }
}

impl<T: Serialize> From<GatewayError> for ApiResponse<T> {
    fn from(err: GatewayError) -> Self {
        Self::AppError(err)
    }
}

fn success_body<T: Serialize>(
    status: StatusCode,
    data: Option<T>,
    message: Option<String>,
) -> Response {
    (
        status,
        Json(SuccessResponse {
            success: true,
            data,
            message,
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_public() {
            self.to_string()
        } else {
            // full detail stays server-side
            tracing::error!(error = ?self, "request failed internally");
            "internal server error".to_string()
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                error: ErrorInfo {
                    code: self.code().to_string(),
                    message,
                },
                timestamp: Utc::now(),
            }),
        )
            .into_response()
    }
}
