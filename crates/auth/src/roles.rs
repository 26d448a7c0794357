use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Capability;

/// Role assigned to a principal.
///
/// Roles are assigned, never inherited; a principal may hold several at once.
/// What a role may do is expressed as a set of [`Capability`] values so that
/// callers check capabilities, not role names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    ResourceManager,
    Customer,
    Delivery,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::ResourceManager, Role::Customer, Role::Delivery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::ResourceManager => "RESOURCE_MANAGER",
            Role::Customer => "CUSTOMER",
            Role::Delivery => "DELIVERY",
        }
    }

    /// Capabilities granted by this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::ViewAllOrders,
                Capability::UpdateAnyOrder,
                Capability::PlaceBooking,
                Capability::ViewOwnOrders,
            ],
            Role::ResourceManager => &[
                Capability::ViewManagedOrders,
                Capability::UpdateManagedOrder,
                Capability::ViewOwnOrders,
            ],
            Role::Customer => &[Capability::PlaceBooking, Capability::ViewOwnOrders],
            Role::Delivery => &[Capability::ViewOwnOrders],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRole(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("resource_manager".parse::<Role>().unwrap(), Role::ResourceManager);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("nobody".parse::<Role>(), Err(UnknownRole("nobody".to_string())));
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Role::ResourceManager).unwrap();
        assert_eq!(json, "\"RESOURCE_MANAGER\"");
    }
}
