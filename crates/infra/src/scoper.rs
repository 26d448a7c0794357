//! Order Visibility Scoper: the listing/get/update surface for orders.
//!
//! Admins query the order store directly. Managers get the union of orders
//! tagged with a managed resource and legacy bookings whose title names one,
//! merged, sorted by id descending, filtered, then paged in memory.

use thiserror::Error;
use tracing::{debug, info};

use slotledger_auth::Principal;
use slotledger_core::{OrderId, Page, PageRequest};
use slotledger_orders::{
    AccessDenied, LegacyOrderMatcher, ListFilter, ManagedScope, Order, OrderScope, OrderStatus,
    StatusUpdateMode, TitleContainsMatcher, VisibilityPolicy, apply_name_filter, merge_sources,
    order_scope,
};

use crate::ownership::ResourceOwnershipIndex;
use crate::store::{OrderStore, ResourceStore, StoreError};

pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AccessDenied),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ScopeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ScopeError::NotFound(what),
            other => ScopeError::Store(other),
        }
    }
}

pub struct OrderVisibilityScoper<O, R, M = TitleContainsMatcher> {
    orders: O,
    ownership: ResourceOwnershipIndex<R>,
    policy: VisibilityPolicy<M>,
    mode: StatusUpdateMode,
    max_page_size: usize,
}

impl<O, R> OrderVisibilityScoper<O, R, TitleContainsMatcher>
where
    O: OrderStore,
    R: ResourceStore,
{
    pub fn new(orders: O, resources: R) -> Self {
        Self::with_policy(orders, resources, VisibilityPolicy::default())
    }
}

impl<O, R, M> OrderVisibilityScoper<O, R, M>
where
    O: OrderStore,
    R: ResourceStore,
    M: LegacyOrderMatcher,
{
    pub fn with_policy(orders: O, resources: R, policy: VisibilityPolicy<M>) -> Self {
        Self {
            orders,
            ownership: ResourceOwnershipIndex::new(resources),
            policy,
            mode: StatusUpdateMode::default(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_status_mode(mut self, mode: StatusUpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = max.max(1);
        self
    }

    pub fn ownership(&self) -> &ResourceOwnershipIndex<R> {
        &self.ownership
    }

    /// The page of orders `principal` may see.
    ///
    /// `total` is always the size of the full filtered set.
    pub fn list_orders(
        &self,
        principal: &Principal,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, ScopeError> {
        let page = page.clamped(self.max_page_size);

        match order_scope(principal) {
            OrderScope::Denied => Err(ScopeError::Unauthorized(AccessDenied::NoOrderRole)),
            OrderScope::Unscoped => {
                let result = self.orders.page(filter, page)?;
                debug!(principal_id = %principal.id, total = result.total, "unscoped order listing");
                Ok(result)
            }
            OrderScope::Managed => self.list_managed(principal, filter, page),
        }
    }

    fn list_managed(
        &self,
        principal: &Principal,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, ScopeError> {
        let scope = self.ownership.managed_scope(principal.id)?;
        if scope.is_empty() {
            debug!(principal_id = %principal.id, "manager has no resources");
            return Ok(Page::empty(page));
        }

        let tagged = self.orders.by_resource_ids(scope.ids(), filter.status)?;
        let legacy = self.orders.legacy_bookings(filter.status)?;
        let (tagged_count, legacy_count) = (tagged.len(), legacy.len());

        let merged = merge_sources(tagged, legacy, &scope, self.policy.legacy_matcher());
        let filtered = apply_name_filter(merged, filter);

        info!(
            principal_id = %principal.id,
            tagged = tagged_count,
            legacy_candidates = legacy_count,
            visible = filtered.len(),
            "scoped order listing"
        );
        Ok(Page::slice(filtered, page))
    }

    /// Whether `principal` may read or mutate `order`.
    pub fn authorize_order_access(&self, principal: &Principal, order: &Order) -> Result<bool, ScopeError> {
        Ok(self.access(principal, order)?.is_ok())
    }

    fn access(&self, principal: &Principal, order: &Order) -> Result<Result<(), AccessDenied>, ScopeError> {
        let mut lookup = Ok(());
        let decision = self.policy.authorize_order_access(principal, order, || {
            self.ownership
                .managed_scope(principal.id)
                .unwrap_or_else(|e| {
                    lookup = Err(e);
                    ManagedScope::empty()
                })
        });
        lookup?;
        Ok(decision)
    }

    fn authorized(&self, principal: &Principal, id: OrderId) -> Result<Order, ScopeError> {
        let order = self.orders.get(id)?.ok_or(ScopeError::NotFound("order"))?;
        self.access(principal, &order)??;
        Ok(order)
    }

    /// Existence is checked before access: a missing order is `NotFound`
    /// for everyone, a foreign one is `Unauthorized`.
    pub fn get_order(&self, principal: &Principal, id: OrderId) -> Result<Order, ScopeError> {
        self.authorized(principal, id)
    }

    pub fn update_status(
        &self,
        principal: &Principal,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ScopeError> {
        let order = self.authorized(principal, id)?;
        if !self.mode.permits(order.status, status) {
            return Err(ScopeError::Validation(format!(
                "cannot move order from {} to {}",
                order.status, status
            )));
        }

        let updated = self.orders.update_status(id, status)?;
        info!(
            principal_id = %principal.id,
            order_id = %id,
            from = %order.status,
            to = %status,
            "order status updated"
        );
        Ok(updated)
    }

    /// The caller's own orders, newest first.
    pub fn list_own_orders(&self, principal: &Principal) -> Result<Vec<Order>, ScopeError> {
        let mut own = self.orders.by_customer(principal.id)?;
        own.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(own)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::Utc;
    use slotledger_auth::Role;
    use slotledger_core::{PrincipalId, ResourceId};
    use slotledger_orders::{NewOrder, PaymentStatus, Resource};

    use crate::store::{InMemoryOrderStore, InMemoryResourceStore};

    type Scoper = OrderVisibilityScoper<Arc<InMemoryOrderStore>, Arc<InMemoryResourceStore>>;

    fn fixture() -> (Scoper, Arc<InMemoryOrderStore>, Arc<InMemoryResourceStore>) {
        let orders = Arc::new(InMemoryOrderStore::new());
        let resources = Arc::new(InMemoryResourceStore::new());
        let scoper = OrderVisibilityScoper::new(orders.clone(), resources.clone());
        (scoper, orders, resources)
    }

    fn insert(store: &InMemoryOrderStore, resource: Option<u64>, title: &str) -> Order {
        store
            .insert(NewOrder {
                customer_id: PrincipalId::new(500),
                total_amount: 1500,
                status: OrderStatus::Initialized,
                payment_status: PaymentStatus::Pending,
                resource_id: resource.map(ResourceId::new),
                booking_title: Some(title.to_string()),
                booking_details: None,
                is_booking: true,
                ordered_at: Utc::now(),
            })
            .unwrap()
    }

    fn manager() -> Principal {
        Principal::new(PrincipalId::new(7), "M", "m@example.com").with_role(Role::ResourceManager)
    }

    fn admin() -> Principal {
        Principal::new(PrincipalId::new(1), "A", "a@example.com").with_role(Role::Admin)
    }

    #[test]
    fn manager_without_resources_gets_empty_page() {
        let (scoper, orders, _) = fixture();
        insert(&orders, Some(101), "Booking: Court A");
        let page = scoper
            .list_orders(&manager(), &ListFilter::default(), PageRequest::default())
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn customer_listing_is_unauthorized() {
        let (scoper, _, _) = fixture();
        let customer = Principal::new(PrincipalId::new(2), "C", "c@example.com").with_role(Role::Customer);
        assert_eq!(
            scoper.list_orders(&customer, &ListFilter::default(), PageRequest::default()),
            Err(ScopeError::Unauthorized(AccessDenied::NoOrderRole))
        );
    }

    #[test]
    fn name_filter_applies_to_both_sources_before_paging() {
        let (scoper, orders, resources) = fixture();
        resources
            .upsert(Resource::new(ResourceId::new(101), "Court A", 1500).with_manager(manager().id))
            .unwrap();
        insert(&orders, Some(101), "Booking: Court A evening");
        insert(&orders, None, "Booking: Court A evening");
        insert(&orders, Some(101), "Booking: Court A morning");
        insert(&orders, None, "Booking: Court A morning");

        let filter = ListFilter::name("EVENING");
        let page = scoper
            .list_orders(&manager(), &filter, PageRequest::new(0, 1))
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id.get(), 2);

        let page = scoper.list_orders(&manager(), &filter, PageRequest::new(1, 1)).unwrap();
        assert_eq!(page.items[0].id.get(), 1);
    }

    #[test]
    fn admin_total_counts_the_whole_filtered_set() {
        let (scoper, orders, _) = fixture();
        for i in 0..7 {
            let title = if i % 2 == 0 { "Booking: Court A" } else { "Booking: Pool" };
            insert(&orders, Some(i), title);
        }
        let page = scoper
            .list_orders(&admin(), &ListFilter::name("court"), PageRequest::new(0, 2))
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn page_size_is_clamped() {
        let (scoper, orders, _) = fixture();
        for _ in 0..5 {
            insert(&orders, None, "Booking: x");
        }
        let scoper = scoper.with_max_page_size(3);
        let page = scoper
            .list_orders(&admin(), &ListFilter::default(), PageRequest::new(0, 1000))
            .unwrap();
        assert_eq!(page.size, 3);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn missing_order_is_not_found_even_for_outsiders() {
        let (scoper, _, _) = fixture();
        let customer = Principal::new(PrincipalId::new(2), "C", "c@example.com").with_role(Role::Customer);
        assert_eq!(
            scoper.get_order(&customer, OrderId::new(404)),
            Err(ScopeError::NotFound("order"))
        );
    }

    #[test]
    fn foreign_order_is_unauthorized_not_hidden() {
        let (scoper, orders, resources) = fixture();
        resources
            .upsert(Resource::new(ResourceId::new(101), "Court A", 1500).with_manager(manager().id))
            .unwrap();
        let foreign = insert(&orders, Some(202), "Booking: Pool");
        assert_eq!(
            scoper.get_order(&manager(), foreign.id),
            Err(ScopeError::Unauthorized(AccessDenied::NotManaged))
        );
        assert_eq!(scoper.authorize_order_access(&manager(), &foreign), Ok(false));
        assert_eq!(scoper.authorize_order_access(&admin(), &foreign), Ok(true));
    }

    #[test]
    fn permissive_mode_allows_any_status_change() {
        let (scoper, orders, _) = fixture();
        let o = insert(&orders, None, "Booking: x");
        scoper.update_status(&admin(), o.id, OrderStatus::Delivered).unwrap();
        let back = scoper.update_status(&admin(), o.id, OrderStatus::Initialized).unwrap();
        assert_eq!(back.status, OrderStatus::Initialized);
    }

    #[test]
    fn strict_mode_rejects_backward_transition() {
        let (scoper, orders, _) = fixture();
        let scoper = scoper.with_status_mode(StatusUpdateMode::Strict);
        let o = insert(&orders, None, "Booking: x");
        scoper.update_status(&admin(), o.id, OrderStatus::Confirmed).unwrap();
        assert!(matches!(
            scoper.update_status(&admin(), o.id, OrderStatus::Initialized),
            Err(ScopeError::Validation(_))
        ));
        assert_eq!(orders.get(o.id).unwrap().unwrap().status, OrderStatus::Confirmed);
    }

    #[test]
    fn own_orders_are_newest_first() {
        let (scoper, orders, _) = fixture();
        insert(&orders, None, "a");
        insert(&orders, None, "b");
        let customer = Principal::new(PrincipalId::new(500), "C", "c@example.com").with_role(Role::Customer);
        let own = scoper.list_own_orders(&customer).unwrap();
        let ids: Vec<u64> = own.iter().map(|o| o.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
