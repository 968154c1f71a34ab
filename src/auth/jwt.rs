//! Session token codec
//!
//! Builds and parses the signed session tokens carried in the
//! `access_token` / `refresh_token` cookies. Validation is pinned to the
//! keyed-HMAC family; a caller-supplied algorithm hint is never honored.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::config::secrets::{SecretPurpose, Secrets};
use crate::config::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use crate::error::{GatewayError, Result};

/// Issuer stamped into every session token.
pub const SESSION_ISSUER: &str = "login@vaultbase";

/// Which half of the session pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// The `sub` marker carried on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }

    const fn ttl(self) -> i64 {
        match self {
            Self::Access => ACCESS_TOKEN_TTL,
            Self::Refresh => REFRESH_TOKEN_TTL,
        }
    }
}

/// Typed session claim set.
///
/// Every field is required; a token missing any of them fails decoding
/// with `ClaimsMalformed` instead of panicking downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    /// Either `access_token` or `refresh_token`.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub role: i64,
    pub id: i64,
    pub email: String,
    pub ver: String,
}

impl SessionClaims {
    /// Which half of the pair this claim set belongs to.
    pub fn kind(&self) -> Result<TokenKind> {
        match self.sub.as_str() {
            "access_token" => Ok(TokenKind::Access),
            "refresh_token" => Ok(TokenKind::Refresh),
            other => Err(GatewayError::claims_malformed(format!(
                "unknown subject marker: {other}"
            ))),
        }
    }
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Session token codec.
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    key_version: String,
}

impl SessionTokenCodec {
    /// Create a codec bound to the process session signing secret.
    #[must_use]
    pub fn new(secrets: &Secrets) -> Self {
        let secret = secrets.signing_secret_for(SecretPurpose::Session);
        let encoding_key = EncodingKey::from_secret(secret);
        let decoding_key = DecodingKey::from_secret(secret);

        // HS256 only: any token naming a different algorithm is rejected
        // before signature verification.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            key_version: secrets.current_key_version().to_string(),
        }
    }

    /// Serialize and sign the given claims.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| GatewayError::signing_failure(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry, returning the typed claims.
    pub fn decode(&self, token: &str) -> Result<SessionClaims> {
        let token_data: TokenData<SessionClaims> =
            decode(token, &self.decoding_key, &self.validation).map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => GatewayError::TokenExpired,
                    ErrorKind::Json(err) => {
                        GatewayError::claims_malformed(format!("bad claim structure: {err}"))
                    }
                    ErrorKind::MissingRequiredClaim(name) => {
                        GatewayError::claims_malformed(format!("missing claim: {name}"))
                    }
                    ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                        GatewayError::claims_malformed("token is not a valid JWT".to_string())
                    }
                    _ => GatewayError::SignatureInvalid,
                }
            })?;
        Ok(token_data.claims)
    }

    /// Mint a single token of the given kind with `iat`/`exp` derived from
    /// the current time.
    pub fn mint(&self, kind: TokenKind, user_id: i64, role: i64, email: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        self.encode(&SessionClaims {
            iss: SESSION_ISSUER.to_string(),
            sub: kind.as_str().to_string(),
            exp: now + kind.ttl(),
            iat: now,
            role,
            id: user_id,
            email: email.to_string(),
            ver: self.key_version.clone(),
        })
    }

    /// Mint a fresh access/refresh pair for the given identity.
    pub fn issue_pair(&self, user_id: i64, role: i64, email: &str) -> Result<TokenPair> {
        let access_token = self.mint(TokenKind::Access, user_id, role, email)?;
        let refresh_token = self.mint(TokenKind::Refresh, user_id, role, email)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: ACCESS_TOKEN_TTL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> SessionTokenCodec {
        let secrets = Secrets::new("session-test-secret", "unused", "v1", "unused");
        SessionTokenCodec::new(&secrets)
    }

    fn claims(kind: TokenKind, iat: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            iss: SESSION_ISSUER.to_string(),
            sub: kind.as_str().to_string(),
            exp,
            iat,
            role: 1,
            id: 42,
            email: "user@example.com".to_string(),
            ver: "v1".to_string(),
        }
    }

    #[test]
    fn round_trip_preserves_fields() {
        let codec = test_codec();
        let now = Utc::now().timestamp();
        let original = claims(TokenKind::Access, now, now + 3600);

        let token = codec.encode(&original).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.kind().unwrap(), TokenKind::Access);
    }

    #[test]
    fn expired_token_is_distinguished_from_forged() {
        let codec = test_codec();
        let now = Utc::now().timestamp();

        let expired = codec
            .encode(&claims(TokenKind::Access, now - 7200, now - 3600))
            .unwrap();
        assert!(matches!(
            codec.decode(&expired).unwrap_err(),
            GatewayError::TokenExpired
        ));

        // Same token signed under a different secret: signature failure,
        // not expiry, even though exp is in the past.
        let other = SessionTokenCodec::new(&Secrets::new("other-secret", "x", "v1", "x"));
        let forged = other
            .encode(&claims(TokenKind::Access, now - 7200, now - 3600))
            .unwrap();
        assert!(matches!(
            codec.decode(&forged).unwrap_err(),
            GatewayError::SignatureInvalid
        ));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let codec = test_codec();
        assert!(matches!(
            codec.decode("not-a-jwt").unwrap_err(),
            GatewayError::ClaimsMalformed { .. }
        ));
    }

    #[test]
    fn minted_pair_validates_and_carries_identity() {
        let codec = test_codec();
        let pair = codec.issue_pair(7, 2, "owner@example.com").unwrap();

        let access = codec.decode(&pair.access_token).unwrap();
        assert_eq!(access.kind().unwrap(), TokenKind::Access);
        assert_eq!(access.id, 7);
        assert_eq!(access.role, 2);
        assert!(access.exp > access.iat);

        let refresh = codec.decode(&pair.refresh_token).unwrap();
        assert_eq!(refresh.kind().unwrap(), TokenKind::Refresh);
        assert!(refresh.exp > access.exp);
    }
}
