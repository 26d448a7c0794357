//! Request Identity Resolver: raw request credentials → acting principal.
//!
//! Resolution never fails hard. Missing or invalid credentials yield
//! [`Identity::Anonymous`]; whether that is acceptable is decided later by the
//! authorization guard of the endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{CredentialBinder, Principal};

/// Read access to principals by login email.
pub trait PrincipalDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<Principal>;
}

impl<D> PrincipalDirectory for Arc<D>
where
    D: PrincipalDirectory + ?Sized,
{
    fn find_by_email(&self, email: &str) -> Option<Principal> {
        (**self).find_by_email(email)
    }
}

/// Raw credential material lifted from a request by the transport layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCredentials<'a> {
    pub bearer: Option<&'a str>,
    pub fingerprint: Option<&'a str>,
    pub session_id: Option<&'a str>,
}

/// Who is acting on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(Principal),
}

impl Identity {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(p) => Some(p),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}

pub struct IdentityResolver<D> {
    binder: Arc<CredentialBinder>,
    directory: D,
}

impl<D: PrincipalDirectory> IdentityResolver<D> {
    pub fn new(binder: Arc<CredentialBinder>, directory: D) -> Self {
        Self { binder, directory }
    }

    pub fn resolve(&self, credentials: RequestCredentials<'_>, now: DateTime<Utc>) -> Identity {
        let Some(token) = credentials.bearer else {
            debug!("no bearer token presented");
            return Identity::Anonymous;
        };

        let claims = match self.binder.validate(
            token,
            credentials.fingerprint,
            credentials.session_id,
            now,
        ) {
            Ok(c) => c,
            Err(reason) => {
                warn!(%reason, "credential rejected, continuing as anonymous");
                return Identity::Anonymous;
            }
        };

        match self.directory.find_by_email(&claims.sub) {
            Some(principal) if principal.active => Identity::Authenticated(principal),
            Some(principal) => {
                warn!(principal_id = %principal.id, "inactive principal presented a valid token");
                Identity::Anonymous
            }
            None => {
                warn!("token subject no longer resolves to a principal");
                Identity::Anonymous
            }
        }
    }
}
