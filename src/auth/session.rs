//! Session rotation state machine
//!
//! Request-scoped evaluation of the presented access/refresh token pair.
//! No server-side session store exists; all state lives in the two tokens.

use std::sync::Arc;

use crate::auth::jwt::{SessionClaims, SessionTokenCodec, TokenKind};
use crate::error::{GatewayError, Result};

/// Outcome of evaluating a presented token pair.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The access token is valid and unexpired.
    Authenticated(SessionClaims),
    /// The access token had expired; a fresh pair was minted from the
    /// refresh token and must replace both cookies in the response.
    Rotated {
        claims: SessionClaims,
        access_token: String,
        refresh_token: String,
    },
    /// No usable pair. Nothing was mutated; the caller must
    /// re-authenticate.
    Rejected,
}

/// Decides whether to accept, rotate or reject a session.
pub struct SessionRotator {
    codec: Arc<SessionTokenCodec>,
}

impl SessionRotator {
    #[must_use]
    pub fn new(codec: Arc<SessionTokenCodec>) -> Self {
        Self { codec }
    }

    /// Evaluate the pair.
    ///
    /// Only a `TokenExpired` failure on the access token is eligible for
    /// rotation; a forged or garbage token is never rotatable. The refresh
    /// token is decoded at most once, and a failure there terminates the
    /// flow. Rotation derives the new expiry from the current time, never
    /// from the old token.
    pub fn evaluate(&self, access_token: &str, refresh_token: &str) -> Result<SessionOutcome> {
        match self.codec.decode(access_token) {
            Ok(claims) => {
                // A refresh token presented where an access token is
                // required is not a session.
                if claims.kind()? != TokenKind::Access {
                    return Ok(SessionOutcome::Rejected);
                }
                Ok(SessionOutcome::Authenticated(claims))
            }
            Err(GatewayError::TokenExpired) => self.rotate(refresh_token),
            Err(_) => Ok(SessionOutcome::Rejected),
        }
    }

    fn rotate(&self, refresh_token: &str) -> Result<SessionOutcome> {
        let Ok(refresh_claims) = self.codec.decode(refresh_token) else {
            return Ok(SessionOutcome::Rejected);
        };
        if refresh_claims.kind()? != TokenKind::Refresh {
            return Ok(SessionOutcome::Rejected);
        }

        let access_token = self.codec.mint(
            TokenKind::Access,
            refresh_claims.id,
            refresh_claims.role,
            &refresh_claims.email,
        )?;
        let new_refresh_token = self.codec.mint(
            TokenKind::Refresh,
            refresh_claims.id,
            refresh_claims.role,
            &refresh_claims.email,
        )?;

        let claims = self.codec.decode(&access_token)?;
        tracing::debug!(user_id = claims.id, "session rotated");

        Ok(SessionOutcome::Rotated {
            claims,
            access_token,
            refresh_token: new_refresh_token,
        })
    }
}
