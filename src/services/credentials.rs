//! Credential verification and issuance
//!
//! The verifier is a pure function over the token and the injected clock: no
//! side effects, no caching. Expiry timeouts are decided here by clock
//! comparison, never by the caller.

use std::sync::Arc;

use chrono::DateTime;

use crate::{
    clock::Clock,
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Session, User, UserClaims},
};

#[derive(Clone)]
pub struct CredentialVerifier {
    secret: String,
    expiration_hours: u64,
    clock: Arc<dyn Clock>,
}

impl CredentialVerifier {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiration_hours,
            clock,
        }
    }

    /// Mint a bearer credential for a user
    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = self.clock.now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp: now + self.expiration_hours as i64 * 3600,
            iat: now,
        };
        claims
            .create_token(&self.secret)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Validate an opaque bearer credential and resolve the session it
    /// carries.
    ///
    /// Fails with `Malformed` when the token cannot be decoded, `Expired`
    /// when the clock has passed the embedded expiry, and `IdentityMismatch`
    /// when an expected-subject hint does not match the decoded subject.
    pub fn verify(&self, token: &str, expected_subject: Option<&str>) -> AppResult<Session> {
        let claims = UserClaims::from_token(token, &self.secret)
            .map_err(|e| AppError::Malformed(e.to_string()))?;
        if self.clock.now().timestamp() >= claims.exp {
            return Err(AppError::Expired);
        }
        if let Some(expected) = expected_subject {
            if expected != claims.sub {
                return Err(AppError::IdentityMismatch);
            }
        }
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::Malformed("expiry out of range".to_string()))?;
        Ok(Session {
            user_id: claims.user_id,
            username: claims.sub,
            role: claims.role,
            expires_at,
        })
    }
}
