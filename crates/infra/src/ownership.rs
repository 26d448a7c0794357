//! Resource Ownership Index: which resources a principal manages.
//!
//! Thin projection over the resource store's manager relation. No caching;
//! every call reads the store.

use std::collections::BTreeSet;

use slotledger_core::{PrincipalId, ResourceId};
use slotledger_orders::ManagedScope;

use crate::store::{ResourceStore, StoreError};

#[derive(Debug, Clone)]
pub struct ResourceOwnershipIndex<R> {
    resources: R,
}

impl<R: ResourceStore> ResourceOwnershipIndex<R> {
    pub fn new(resources: R) -> Self {
        Self { resources }
    }

    pub fn managed_resource_ids(&self, principal: PrincipalId) -> Result<BTreeSet<ResourceId>, StoreError> {
        Ok(self
            .resources
            .managed_by(principal)?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }

    /// Lowercase names of managed resources.
    pub fn managed_resource_names(&self, principal: PrincipalId) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.managed_scope(principal)?.names().iter().cloned().collect())
    }

    /// Ids and names in one read.
    pub fn managed_scope(&self, principal: PrincipalId) -> Result<ManagedScope, StoreError> {
        let managed = self.resources.managed_by(principal)?;
        Ok(ManagedScope::from_resources(&managed))
    }
}
