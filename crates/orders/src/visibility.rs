//! Who may see or mutate an order.
//!
//! Decision table, first match wins:
//! 1. unscoped principals (admins) are always allowed;
//! 2. an order tagged with a resource is allowed iff that resource is managed;
//! 3. an untagged order with a title is handed to the [`LegacyOrderMatcher`];
//! 4. everything else is denied.

use std::collections::BTreeSet;

use thiserror::Error;

use slotledger_auth::{Capability, Principal};
use slotledger_core::ResourceId;

use crate::{Order, Resource};

/// The slice of resources a manager is responsible for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedScope {
    ids: BTreeSet<ResourceId>,
    names: Vec<String>,
}

impl ManagedScope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from resource records. Names are lowercased; blank names are
    /// skipped since an empty needle would match every title.
    pub fn from_resources<'a>(resources: impl IntoIterator<Item = &'a Resource>) -> Self {
        let mut scope = Self::default();
        for r in resources {
            scope.ids.insert(r.id);
            let name = r.name.trim().to_lowercase();
            if !name.is_empty() && !scope.names.contains(&name) {
                scope.names.push(name);
            }
        }
        scope
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }

    pub fn contains_id(&self, id: ResourceId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<ResourceId> {
        &self.ids
    }

    /// Lowercase resource names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Compatibility shim for orders written before resource linkage existed.
///
/// Only consulted for orders without a `resource_id`. Delete the implementation
/// once legacy rows are backfilled.
pub trait LegacyOrderMatcher: Send + Sync {
    fn matches(&self, order: &Order, scope: &ManagedScope) -> bool;
}

/// Matches when the booking title contains any managed resource name,
/// case-insensitively.
///
/// Ambiguous by nature: "Court A" also matches "Court AB".
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleContainsMatcher;

impl LegacyOrderMatcher for TitleContainsMatcher {
    fn matches(&self, order: &Order, scope: &ManagedScope) -> bool {
        if order.resource_id.is_some() {
            return false;
        }
        let Some(title) = order.booking_title.as_deref() else {
            return false;
        };
        let title = title.to_lowercase();
        scope.names().iter().any(|n| title.contains(n.as_str()))
    }
}

/// Which orders a principal can reach at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Unscoped,
    Managed,
    Denied,
}

pub fn order_scope(principal: &Principal) -> OrderScope {
    if principal.can(Capability::ViewAllOrders) {
        OrderScope::Unscoped
    } else if principal.can(Capability::ViewManagedOrders) {
        OrderScope::Managed
    } else {
        OrderScope::Denied
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("order does not belong to a resource you manage")]
    NotManaged,

    #[error("principal holds no order-management role")]
    NoOrderRole,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityPolicy<M = TitleContainsMatcher> {
    legacy: M,
}

impl<M: LegacyOrderMatcher> VisibilityPolicy<M> {
    pub fn new(legacy: M) -> Self {
        Self { legacy }
    }

    pub fn legacy_matcher(&self) -> &M {
        &self.legacy
    }

    /// Decide access to a single order.
    ///
    /// `resolve_scope` is only called for managed principals.
    pub fn authorize_order_access(
        &self,
        principal: &Principal,
        order: &Order,
        resolve_scope: impl FnOnce() -> ManagedScope,
    ) -> Result<(), AccessDenied> {
        match order_scope(principal) {
            OrderScope::Unscoped => Ok(()),
            OrderScope::Denied => Err(AccessDenied::NoOrderRole),
            OrderScope::Managed => {
                let scope = resolve_scope();
                if self.allows(order, &scope) {
                    Ok(())
                } else {
                    Err(AccessDenied::NotManaged)
                }
            }
        }
    }

    /// Rules 2-4 for a managed principal whose scope is already known.
    pub fn allows(&self, order: &Order, scope: &ManagedScope) -> bool {
        match order.resource_id {
            Some(id) => scope.contains_id(id),
            None if order.booking_title.is_some() => self.legacy.matches(order, scope),
            None => false,
        }
    }
}
