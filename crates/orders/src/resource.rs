use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use slotledger_core::{Entity, PrincipalId, ResourceId};

/// A bookable resource (court, room, vehicle, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Principals that manage this resource.
    pub managers: BTreeSet<PrincipalId>,
    /// Price of one slot in smallest currency unit.
    pub price_per_slot: u64,
    pub location: Option<String>,
    pub active: bool,
}

impl Resource {
    pub fn new(id: ResourceId, name: impl Into<String>, price_per_slot: u64) -> Self {
        Self {
            id,
            name: name.into(),
            managers: BTreeSet::new(),
            price_per_slot,
            location: None,
            active: true,
        }
    }

    pub fn with_manager(mut self, manager: PrincipalId) -> Self {
        self.managers.insert(manager);
        self
    }

    pub fn is_managed_by(&self, principal: PrincipalId) -> bool {
        self.managers.contains(&principal)
    }
}

impl Entity for Resource {
    type Id = ResourceId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
