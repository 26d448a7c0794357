use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use slotledger_core::{OrderId, Page, PageRequest, PrincipalId, ResourceId};
use slotledger_orders::{ListFilter, NewOrder, Order, OrderStatus, Resource};
use slotledger_auth::Principal;

use super::{
    NewPrincipal, OrderStore, PrincipalRecord, PrincipalStore, ResourceStore, StoreError,
};

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// Monotonic id source starting at 1.
#[derive(Debug)]
struct Sequence(AtomicU64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    /// Make sure future ids are strictly greater than `seen`.
    fn observe(&self, seen: u64) {
        self.0.fetch_max(seen.saturating_add(1), Ordering::SeqCst);
    }
}

/// In-memory order store for tests/dev.
///
/// Keyed by id in a `BTreeMap`, so iteration order is id order.
#[derive(Debug)]
pub struct InMemoryOrderStore {
    orders: RwLock<BTreeMap<OrderId, Order>>,
    ids: Sequence,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(BTreeMap::new()),
            ids: Sequence::new(),
        }
    }

    /// Store an order under its own id (fixtures, migrated data).
    pub fn seed(&self, order: Order) -> Result<(), StoreError> {
        let mut map = self.orders.write().map_err(poisoned)?;
        self.ids.observe(order.id.get());
        map.insert(order.id, order);
        Ok(())
    }

    fn select(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, StoreError> {
        let map = self.orders.read().map_err(poisoned)?;
        Ok(map.values().filter(|o| keep(o)).cloned().collect())
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn status_matches(order: &Order, status: Option<OrderStatus>) -> bool {
    status.is_none_or(|s| s == order.status)
}

impl OrderStore for InMemoryOrderStore {
    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let map = self.orders.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut map = self.orders.write().map_err(poisoned)?;
        let id = OrderId::new(self.ids.next());
        let order = order.into_order(id);
        map.insert(id, order.clone());
        Ok(order)
    }

    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        let mut map = self.orders.write().map_err(poisoned)?;
        let order = map.get_mut(&id).ok_or(StoreError::NotFound("order"))?;
        order.status = status;
        Ok(order.clone())
    }

    fn page(&self, filter: &ListFilter, page: PageRequest) -> Result<Page<Order>, StoreError> {
        let map = self.orders.read().map_err(poisoned)?;
        let matching: Vec<Order> = map
            .values()
            .rev()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        Ok(Page::slice(matching, page))
    }

    fn by_resource_ids(
        &self,
        ids: &BTreeSet<ResourceId>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(|o| {
            o.resource_id.is_some_and(|r| ids.contains(&r)) && status_matches(o, status)
        })
    }

    fn legacy_bookings(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        self.select(|o| o.is_legacy_booking() && status_matches(o, status))
    }

    fn by_customer(&self, customer: PrincipalId) -> Result<Vec<Order>, StoreError> {
        self.select(|o| o.customer_id == customer)
    }
}

/// In-memory resource store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    resources: RwLock<BTreeMap<ResourceId, Resource>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn get(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        let map = self.resources.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    fn managed_by(&self, principal: PrincipalId) -> Result<Vec<Resource>, StoreError> {
        let map = self.resources.read().map_err(poisoned)?;
        Ok(map
            .values()
            .filter(|r| r.is_managed_by(principal))
            .cloned()
            .collect())
    }

    fn upsert(&self, resource: Resource) -> Result<(), StoreError> {
        let mut map = self.resources.write().map_err(poisoned)?;
        map.insert(resource.id, resource);
        Ok(())
    }
}

/// In-memory principal store for tests/dev. Emails are unique.
#[derive(Debug)]
pub struct InMemoryPrincipalStore {
    principals: RwLock<BTreeMap<PrincipalId, PrincipalRecord>>,
    ids: Sequence,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self {
            principals: RwLock::new(BTreeMap::new()),
            ids: Sequence::new(),
        }
    }
}

impl Default for InMemoryPrincipalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PrincipalStore for InMemoryPrincipalStore {
    fn get(&self, id: PrincipalId) -> Result<Option<PrincipalRecord>, StoreError> {
        let map = self.principals.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, StoreError> {
        let map = self.principals.read().map_err(poisoned)?;
        Ok(map
            .values()
            .find(|r| r.principal.email == email)
            .cloned())
    }

    fn insert(&self, new: NewPrincipal) -> Result<PrincipalRecord, StoreError> {
        let mut map = self.principals.write().map_err(poisoned)?;
        if map.values().any(|r| r.principal.email == new.email) {
            return Err(StoreError::Conflict(format!("email '{}' already registered", new.email)));
        }

        let id = PrincipalId::new(self.ids.next());
        let mut principal = Principal::new(id, new.name, new.email);
        principal.roles = new.roles;
        let record = PrincipalRecord {
            principal,
            password_hash: new.password_hash,
        };
        map.insert(id, record.clone());
        Ok(record)
    }

    fn upsert(&self, record: PrincipalRecord) -> Result<(), StoreError> {
        let mut map = self.principals.write().map_err(poisoned)?;
        let id = record.principal.id;
        if map
            .values()
            .any(|r| r.principal.id != id && r.principal.email == record.principal.email)
        {
            return Err(StoreError::Conflict(format!(
                "email '{}' already registered",
                record.principal.email
            )));
        }
        self.ids.observe(id.get());
        map.insert(id, record);
        Ok(())
    }
}
