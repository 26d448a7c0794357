use thiserror::Error;

use crate::{Capability, Identity, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing capability '{0}'")]
    Forbidden(Capability),
}

/// Require an authenticated principal holding `required`.
///
/// - No IO
/// - No panics
/// - Anonymous identities are rejected here, not during resolution.
pub fn authorize(identity: &Identity, required: Capability) -> Result<&Principal, AuthzError> {
    let principal = identity.principal().ok_or(AuthzError::Unauthenticated)?;
    if principal.can(required) {
        Ok(principal)
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

/// Require an authenticated principal holding at least one of `any_of`.
///
/// The first capability is reported when none match.
pub fn authorize_any<'a>(
    identity: &'a Identity,
    any_of: &[Capability],
) -> Result<&'a Principal, AuthzError> {
    let principal = identity.principal().ok_or(AuthzError::Unauthenticated)?;
    if any_of.iter().any(|c| principal.can(*c)) {
        return Ok(principal);
    }
    match any_of.first() {
        Some(first) => Err(AuthzError::Forbidden(*first)),
        None => Ok(principal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotledger_core::PrincipalId;

    use crate::Role;

    fn identity(role: Role) -> Identity {
        Identity::Authenticated(Principal::new(PrincipalId::new(1), "P", "p@example.com").with_role(role))
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        assert_eq!(
            authorize(&Identity::Anonymous, Capability::ViewOwnOrders).unwrap_err(),
            AuthzError::Unauthenticated
        );
    }

    #[test]
    fn capability_check_follows_roles() {
        assert!(authorize(&identity(Role::Customer), Capability::PlaceBooking).is_ok());
        assert_eq!(
            authorize(&identity(Role::Customer), Capability::ViewAllOrders).unwrap_err(),
            AuthzError::Forbidden(Capability::ViewAllOrders)
        );
        assert!(
            authorize_any(
                &identity(Role::ResourceManager),
                &[Capability::ViewAllOrders, Capability::ViewManagedOrders]
            )
            .is_ok()
        );
    }
}
