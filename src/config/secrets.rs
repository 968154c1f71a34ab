//! # Process secrets
//!
//! The signing secrets and key-format version, read from the environment
//! exactly once at startup and held immutable for the process lifetime.
//! Components receive this by reference; nothing re-reads the environment
//! per call.

use std::env;

use crate::error::{GatewayError, Result};

/// What a signing secret is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPurpose {
    /// Session token (JWT) signing.
    Session,
    /// API key HMAC signing.
    ApiKey,
}

/// Immutable process-wide secret material.
///
/// Construction fails fast when any required variable is absent; the
/// process must not start credential operations without it.
#[derive(Clone)]
pub struct Secrets {
    session_signing_key: Vec<u8>,
    api_key_secret: Vec<u8>,
    key_version: String,
    perimeter_secret: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // secret bytes never reach logs
        f.debug_struct("Secrets")
            .field("key_version", &self.key_version)
            .finish_non_exhaustive()
    }
}

const SESSION_SIGNING_KEY_VAR: &str = "VAULTBASE_SESSION_SIGNING_KEY";
const API_KEY_SECRET_VAR: &str = "VAULTBASE_API_KEY_SECRET";
const KEY_VERSION_VAR: &str = "VAULTBASE_KEY_VERSION";
const PERIMETER_SECRET_VAR: &str = "VAULTBASE_PERIMETER_SECRET";

impl Secrets {
    /// Read all required secrets from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            session_signing_key: require(SESSION_SIGNING_KEY_VAR)?.into_bytes(),
            api_key_secret: require(API_KEY_SECRET_VAR)?.into_bytes(),
            key_version: require(KEY_VERSION_VAR)?,
            perimeter_secret: require(PERIMETER_SECRET_VAR)?,
        })
    }

    /// Build secrets from explicit values (tests, embedding).
    #[must_use]
    pub fn new(
        session_signing_key: impl Into<Vec<u8>>,
        api_key_secret: impl Into<Vec<u8>>,
        key_version: impl Into<String>,
        perimeter_secret: impl Into<String>,
    ) -> Self {
        Self {
            session_signing_key: session_signing_key.into(),
            api_key_secret: api_key_secret.into(),
            key_version: key_version.into(),
            perimeter_secret: perimeter_secret.into(),
        }
    }

    /// The signing secret for the given purpose.
    #[must_use]
    pub fn signing_secret_for(&self, purpose: SecretPurpose) -> &[u8] {
        match purpose {
            SecretPurpose::Session => &self.session_signing_key,
            SecretPurpose::ApiKey => &self.api_key_secret,
        }
    }

    /// The current key-format version tag stamped into issued API keys.
    #[must_use]
    pub fn current_key_version(&self) -> &str {
        &self.key_version
    }

    /// The shared secret the perimeter check validates against.
    #[must_use]
    pub fn perimeter_secret(&self) -> &str {
        &self.perimeter_secret
    }
}

fn require(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(GatewayError::config_missing(format!(
            "required environment variable {name} is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_secrets_resolve_by_purpose() {
        let secrets = Secrets::new("session-secret", "api-key-secret", "v1", "perimeter");
        assert_eq!(
            secrets.signing_secret_for(SecretPurpose::Session),
            b"session-secret"
        );
        assert_eq!(
            secrets.signing_secret_for(SecretPurpose::ApiKey),
            b"api-key-secret"
        );
        assert_eq!(secrets.current_key_version(), "v1");
        assert_eq!(secrets.perimeter_secret(), "perimeter");
    }

    #[test]
    fn missing_variable_is_configuration_missing() {
        let err = require("VAULTBASE_TEST_VAR_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, GatewayError::ConfigurationMissing { .. }));
    }

    #[test]
    fn debug_does_not_leak_secret_bytes() {
        let secrets = Secrets::new("hush-session", "hush-apikey", "v1", "hush-perimeter");
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("hush"));
        assert!(rendered.contains("v1"));
    }
}
