use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use slotledger_core::{Entity, PrincipalId};

use crate::{Capability, Role};

/// A fully loaded actor: identity plus the roles granted to it.
///
/// Principals are never deleted; `active == false` marks a deactivated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub active: bool,
}

impl Principal {
    pub fn new(id: PrincipalId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            roles: BTreeSet::new(),
            active: true,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.roles
            .iter()
            .any(|r| r.capabilities().contains(&capability))
    }
}

impl Entity for Principal {
    type Id = PrincipalId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
