//! `slotledger-auth`: authentication and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: request
//! plumbing hands it raw header values, and principals are looked up through
//! the [`PrincipalDirectory`] trait.

pub mod authorize;
pub mod binder;
pub mod capabilities;
pub mod claims;
pub mod cookie;
pub mod fingerprint;
pub mod password;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use authorize::{AuthzError, authorize, authorize_any};
pub use binder::{AuthFailure, CredentialBinder, DEFAULT_TOKEN_TTL_DAYS, IssueError, IssuedCredential};
pub use capabilities::Capability;
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use cookie::{DEFAULT_SESSION_COOKIE, SessionCookieSpec};
pub use fingerprint::hash_fingerprint;
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use resolver::{Identity, IdentityResolver, PrincipalDirectory, RequestCredentials};
pub use roles::{Role, UnknownRole};
