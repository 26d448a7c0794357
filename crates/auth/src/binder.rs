//! Credential Binder: issues and validates session-bound access tokens.
//!
//! A token is bound to two things besides its signature:
//! - a one-way hash of the client fingerprint presented at issuance, and
//! - a random session id that the client also receives as an HTTP-only cookie.
//!
//! A stolen bearer token alone is therefore not enough to authenticate.
//! There is no server-side session store; expiry is the only revocation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};
use crate::fingerprint::hash_fingerprint;

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// A freshly minted token/session pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub token: String,
    pub sid: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Why a presented credential was rejected.
///
/// Callers must collapse every variant into a single "unauthenticated"
/// outcome; the reason exists for internal logging only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    BadSignature,

    #[error(transparent)]
    Window(#[from] TokenValidationError),

    #[error("token carries no fingerprint binding")]
    UnboundFingerprint,

    #[error("client fingerprint does not match token")]
    FingerprintMismatch,

    #[error("token carries no session id")]
    MissingSessionClaim,

    #[error("session cookie is missing")]
    MissingSessionCookie,

    #[error("session cookie does not match token")]
    SessionMismatch,
}

/// Signs and verifies HS256 tokens carrying fingerprint and session bindings.
#[derive(Clone)]
pub struct CredentialBinder {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for CredentialBinder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialBinder")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CredentialBinder {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `email`, bound to `fingerprint` and a fresh session id.
    ///
    /// The returned `sid` must also be handed to the client as a cookie.
    pub fn issue(
        &self,
        email: &str,
        fingerprint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential, IssueError> {
        if email.trim().is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let sid = Uuid::new_v4().simple().to_string();
        let claims = TokenClaims {
            sub: email.to_string(),
            iat: now,
            exp: now + self.ttl,
            ua: hash_fingerprint(fingerprint),
            sid: sid.clone(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| IssueError::Signing(e.to_string()))?;

        Ok(IssuedCredential {
            token,
            sid,
            expires_at: claims.exp,
        })
    }

    /// Verify a presented token against the presenting client.
    ///
    /// Every check is mandatory: signature, time window, fingerprint binding
    /// and session binding.
    pub fn validate(
        &self,
        token: &str,
        fingerprint: Option<&str>,
        sid_cookie: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthFailure> {
        let claims = self.decode(token)?;

        validate_claims(&claims, now)?;

        if claims.ua.is_empty() {
            return Err(AuthFailure::UnboundFingerprint);
        }
        if claims.ua != hash_fingerprint(fingerprint) {
            return Err(AuthFailure::FingerprintMismatch);
        }

        if claims.sid.is_empty() {
            return Err(AuthFailure::MissingSessionClaim);
        }
        match sid_cookie {
            None => return Err(AuthFailure::MissingSessionCookie),
            Some(sid) if sid != claims.sid => return Err(AuthFailure::SessionMismatch),
            Some(_) => {}
        }

        Ok(claims)
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, AuthFailure> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `validate_claims`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthFailure::BadSignature,
                _ => AuthFailure::Malformed(e.to_string()),
            })
    }
}
