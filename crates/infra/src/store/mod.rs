//! Record stores consumed by the order services.
//!
//! Stores are plain point/predicate lookups; every scoping decision is made
//! by the callers.

mod directory;
mod in_memory;

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use slotledger_auth::{Principal, Role};
use slotledger_core::{OrderId, Page, PageRequest, PrincipalId, ResourceId};
use slotledger_orders::{ListFilter, NewOrder, Order, OrderStatus, Resource};

pub use directory::StoreDirectory;
pub use in_memory::{InMemoryOrderStore, InMemoryPrincipalStore, InMemoryResourceStore};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait OrderStore: Send + Sync {
    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Persist a new order; the store assigns a monotonically increasing id.
    fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, StoreError>;

    /// All orders matching `filter`, ordered by id descending, then paged.
    fn page(&self, filter: &ListFilter, page: PageRequest) -> Result<Page<Order>, StoreError>;

    /// Unpaged orders tagged with one of `ids`.
    fn by_resource_ids(
        &self,
        ids: &BTreeSet<ResourceId>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, StoreError>;

    /// Unpaged booking orders without a resource tag.
    fn legacy_bookings(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError>;

    fn by_customer(&self, customer: PrincipalId) -> Result<Vec<Order>, StoreError>;
}

pub trait ResourceStore: Send + Sync {
    fn get(&self, id: ResourceId) -> Result<Option<Resource>, StoreError>;
    fn managed_by(&self, principal: PrincipalId) -> Result<Vec<Resource>, StoreError>;
    fn upsert(&self, resource: Resource) -> Result<(), StoreError>;
}

/// A principal together with its stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub principal: Principal,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Registration input; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
    pub name: String,
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub password_hash: String,
}

pub trait PrincipalStore: Send + Sync {
    fn get(&self, id: PrincipalId) -> Result<Option<PrincipalRecord>, StoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the email is taken.
    fn insert(&self, principal: NewPrincipal) -> Result<PrincipalRecord, StoreError>;

    fn upsert(&self, record: PrincipalRecord) -> Result<(), StoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get(id)
    }

    fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        (**self).insert(order)
    }

    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        (**self).update_status(id, status)
    }

    fn page(&self, filter: &ListFilter, page: PageRequest) -> Result<Page<Order>, StoreError> {
        (**self).page(filter, page)
    }

    fn by_resource_ids(
        &self,
        ids: &BTreeSet<ResourceId>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, StoreError> {
        (**self).by_resource_ids(ids, status)
    }

    fn legacy_bookings(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        (**self).legacy_bookings(status)
    }

    fn by_customer(&self, customer: PrincipalId) -> Result<Vec<Order>, StoreError> {
        (**self).by_customer(customer)
    }
}

impl<S> ResourceStore for Arc<S>
where
    S: ResourceStore + ?Sized,
{
    fn get(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        (**self).get(id)
    }

    fn managed_by(&self, principal: PrincipalId) -> Result<Vec<Resource>, StoreError> {
        (**self).managed_by(principal)
    }

    fn upsert(&self, resource: Resource) -> Result<(), StoreError> {
        (**self).upsert(resource)
    }
}

impl<S> PrincipalStore for Arc<S>
where
    S: PrincipalStore + ?Sized,
{
    fn get(&self, id: PrincipalId) -> Result<Option<PrincipalRecord>, StoreError> {
        (**self).get(id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, StoreError> {
        (**self).find_by_email(email)
    }

    fn insert(&self, principal: NewPrincipal) -> Result<PrincipalRecord, StoreError> {
        (**self).insert(principal)
    }

    fn upsert(&self, record: PrincipalRecord) -> Result<(), StoreError> {
        (**self).upsert(record)
    }
}
