//! Integration tests for the full booking/visibility pipeline.
//!
//! Tests: login credential → IdentityResolver → BookingLedger → Scoper
//!
//! Verifies:
//! - A manager sees tagged and legacy orders of managed resources, newest first
//! - Removing a manager from a resource removes both from their view
//! - Access checks agree with listing for every order

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    use slotledger_auth::{
        CredentialBinder, Identity, IdentityResolver, Principal, RequestCredentials, Role,
    };
    use slotledger_core::{OrderId, PageRequest, PrincipalId, ResourceId};
    use slotledger_orders::{
        BookingSlot, ListFilter, Order, OrderStatus, PaymentStatus, Resource,
    };

    use crate::ledger::BookingLedger;
    use crate::notify::{InMemoryOutbox, PlaceholderRenderer};
    use crate::scoper::OrderVisibilityScoper;
    use crate::store::{
        InMemoryOrderStore, InMemoryPrincipalStore, InMemoryResourceStore, OrderStore,
        PrincipalRecord, PrincipalStore, ResourceStore, StoreDirectory,
    };

    const UA: &str = "Mozilla/5.0 test";

    struct World {
        orders: Arc<InMemoryOrderStore>,
        resources: Arc<InMemoryResourceStore>,
        scoper: OrderVisibilityScoper<Arc<InMemoryOrderStore>, Arc<InMemoryResourceStore>>,
    }

    fn world() -> World {
        let orders = Arc::new(InMemoryOrderStore::new());
        let resources = Arc::new(InMemoryResourceStore::new());
        let scoper = OrderVisibilityScoper::new(orders.clone(), resources.clone());
        World {
            orders,
            resources,
            scoper,
        }
    }

    fn manager() -> Principal {
        Principal::new(PrincipalId::new(7), "Mia", "mia@example.com").with_role(Role::ResourceManager)
    }

    fn court(managers: &[PrincipalId]) -> Resource {
        let mut r = Resource::new(ResourceId::new(101), "Court A", 1500);
        r.managers = managers.iter().copied().collect();
        r
    }

    fn legacy(id: u64, title: &str) -> Order {
        Order {
            id: OrderId::new(id),
            customer_id: PrincipalId::new(500),
            total_amount: 1500,
            status: OrderStatus::Initialized,
            payment_status: PaymentStatus::Pending,
            resource_id: None,
            booking_title: Some(title.to_string()),
            booking_details: None,
            is_booking: true,
            ordered_at: Utc::now(),
        }
    }

    fn tagged(id: u64, resource: u64) -> Order {
        Order {
            resource_id: Some(ResourceId::new(resource)),
            booking_title: None,
            ..legacy(id, "")
        }
    }

    fn listed_ids(w: &World, p: &Principal) -> Vec<u64> {
        w.scoper
            .list_orders(p, &ListFilter::default(), PageRequest::new(0, 50))
            .unwrap()
            .items
            .iter()
            .map(|o| o.id.get())
            .collect()
    }

    #[test]
    fn manager_sees_tagged_and_legacy_orders_newest_first() {
        let w = world();
        w.resources.upsert(court(&[manager().id])).unwrap();
        w.orders.seed(tagged(1, 101)).unwrap();
        w.orders.seed(legacy(2, "Booking: Court A")).unwrap();
        w.orders.seed(legacy(3, "Booking: Pool")).unwrap();

        assert_eq!(listed_ids(&w, &manager()), vec![2, 1]);
    }

    #[test]
    fn removing_the_manager_hides_both_orders() {
        let w = world();
        w.resources.upsert(court(&[manager().id])).unwrap();
        w.orders.seed(tagged(1, 101)).unwrap();
        w.orders.seed(legacy(2, "Booking: Court A")).unwrap();

        w.resources.upsert(court(&[])).unwrap();

        let page = w
            .scoper
            .list_orders(&manager(), &ListFilter::default(), PageRequest::default())
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        for id in [1, 2] {
            assert!(w.scoper.get_order(&manager(), OrderId::new(id)).is_err());
        }
    }

    #[test]
    fn booked_order_reaches_manager_through_authenticated_request() {
        let w = world();
        w.resources.upsert(court(&[manager().id])).unwrap();

        let principals = Arc::new(InMemoryPrincipalStore::new());
        let customer = Principal::new(PrincipalId::new(3), "Cleo", "cleo@example.com").with_role(Role::Customer);
        principals
            .upsert(PrincipalRecord {
                principal: customer,
                password_hash: String::new(),
            })
            .unwrap();

        let binder = Arc::new(CredentialBinder::new(b"integration", Duration::days(30)));
        let resolver = IdentityResolver::new(binder.clone(), StoreDirectory::new(principals));
        let now = Utc::now();
        let cred = binder.issue("cleo@example.com", Some(UA), now).unwrap();
        let identity = resolver.resolve(
            RequestCredentials {
                bearer: Some(&cred.token),
                fingerprint: Some(UA),
                session_id: Some(&cred.sid),
            },
            now,
        );
        let Identity::Authenticated(customer) = identity else {
            panic!("customer should authenticate");
        };

        let ledger = BookingLedger::new(
            w.orders.clone(),
            w.resources.clone(),
            InMemoryOutbox::new(),
            PlaceholderRenderer::new(),
        );
        let slot = BookingSlot::parse("2025-03-02", "18:00", "19:00", 1).unwrap();
        let receipt = ledger
            .book_resource(&customer, ResourceId::new(101), &[slot], now)
            .unwrap();

        assert_eq!(listed_ids(&w, &manager()), vec![receipt.order.id.get()]);
        assert_eq!(
            w.scoper.list_own_orders(&customer).unwrap(),
            vec![receipt.order.clone()]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: an order is listed for a manager iff authorize_order_access allows it.
        #[test]
        fn listing_agrees_with_access_checks(
            managed in proptest::collection::btree_set(1u64..6, 0..4),
            rows in proptest::collection::vec((proptest::option::of(1u64..6), 0usize..3), 0..25),
        ) {
            let w = world();
            let names = ["Court A", "Pool", "Sauna"];
            for rid in 1u64..6 {
                let mut r = Resource::new(ResourceId::new(rid), format!("{} {rid}", names[rid as usize % 3]), 100);
                if managed.contains(&rid) {
                    r.managers.insert(manager().id);
                }
                w.resources.upsert(r).unwrap();
            }
            for (i, (rid, t)) in rows.iter().enumerate() {
                let id = i as u64 + 1;
                let order = match rid {
                    Some(rid) => tagged(id, *rid),
                    None => legacy(id, &format!("Booking: {} {}", names[*t], i % 6)),
                };
                w.orders.seed(order).unwrap();
            }

            let listed: BTreeSet<u64> = listed_ids(&w, &manager()).into_iter().collect();
            for (i, _) in rows.iter().enumerate() {
                let order = w.orders.get(OrderId::new(i as u64 + 1)).unwrap().unwrap();
                let allowed = w.scoper.authorize_order_access(&manager(), &order).unwrap();
                prop_assert_eq!(allowed, listed.contains(&order.id.get()));
            }
        }
    }
}
