//! The unified error handling system for the gateway.
//!
//! Credential failures carry only a category across the wire; anything
//! classified as internal keeps its detail server-side.

use axum::http::StatusCode;
use thiserror::Error;

/// A unified `Result` type for the entire application.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Application error taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required secret or config value is absent at startup. Fatal.
    #[error("configuration missing: {message}")]
    ConfigurationMissing { message: String },

    /// Signing could not be performed (secret unavailable mid-flight).
    #[error("signing failure: {message}")]
    SigningFailure { message: String },

    /// Forged or corrupted credential. Never retried.
    #[error("signature invalid")]
    SignatureInvalid,

    /// Credential verified correctly but its expiry has passed.
    /// Recoverable via rotation for access tokens only.
    #[error("token expired")]
    TokenExpired,

    /// Session claims are structurally bad (missing or mis-typed field).
    #[error("claims malformed: {message}")]
    ClaimsMalformed { message: String },

    /// API key string is structurally bad (arity, encoding).
    #[error("key malformed: {message}")]
    KeyMalformed { message: String },

    /// Unknown user, service or key.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Provisioning validation failed before any mutation.
    #[error("precondition failed: {message}")]
    PreconditionFailed { message: String },

    /// The resource being created already exists.
    #[error("already exists: {message}")]
    AlreadyExists { message: String },

    /// Valid credential, insufficient capability.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Storage failure not attributable to the caller.
    #[error("database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Anything else not attributable to the caller.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl GatewayError {
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    pub fn signing_failure(message: impl Into<String>) -> Self {
        Self::SigningFailure {
            message: message.into(),
        }
    }

    pub fn claims_malformed(message: impl Into<String>) -> Self {
        Self::ClaimsMalformed {
            message: message.into(),
        }
    }

    pub fn key_malformed(message: impl Into<String>) -> Self {
        Self::KeyMalformed {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Stable machine-readable category code for the response envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing { .. } => "CONFIGURATION_MISSING",
            Self::SigningFailure { .. } => "SIGNING_FAILURE",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::ClaimsMalformed { .. } => "CLAIMS_MALFORMED",
            Self::KeyMalformed { .. } => "KEY_MALFORMED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PreconditionFailed { .. } => "PRECONDITION_FAILED",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Database { .. } | Self::Internal { .. } => "INTERNAL",
        }
    }

    /// HTTP status for the response envelope.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::SignatureInvalid | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::ClaimsMalformed { .. } | Self::KeyMalformed { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::ConfigurationMissing { .. }
            | Self::SigningFailure { .. }
            | Self::Database { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to hand to the caller verbatim.
    /// Internal detail stays in the server log.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        !matches!(
            self,
            Self::ConfigurationMissing { .. }
                | Self::SigningFailure { .. }
                | Self::Database { .. }
                | Self::Internal { .. }
        )
    }
}

impl From<sea_orm::DbErr> for GatewayError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database {
            message: "database operation failed".to_string(),
            source: Some(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            GatewayError::SignatureInvalid.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::unauthorized("no storage").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::already_exists("dup").status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_detail_is_not_public() {
        let err = GatewayError::internal("connection pool exhausted");
        assert!(!err.is_public());
        assert_eq!(err.code(), "INTERNAL");

        let err = GatewayError::unauthorized("key lacks cache capability");
        assert!(err.is_public());
    }
}
