//! Booking Ledger Writer: turns a resource booking into an order record.
//!
//! The resource a booking belongs to travels in an explicit
//! [`BookingContext`] owned by the request. `create_booking_order` takes the
//! value out before doing anything else, so the context is empty afterwards
//! on every path, including validation and store failures.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use slotledger_auth::Principal;
use slotledger_core::ResourceId;
use slotledger_orders::{
    BookingContext, BookingDraft, BookingSlot, BookingValidationError, NewOrder, Order,
    OrderStatus, PaymentStatus, Resource, booking_amount, booking_title, slots_summary,
};

use crate::notify::{BOOKING_CONFIRMATION, Notifier, OutboundEmail, TemplateContext, TemplateRenderer};
use crate::store::{OrderStore, ResourceStore, StoreError};

pub const DEFAULT_PAYMENT_LINK_BASE: &str = "http://localhost:3000/pay?order=";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] BookingValidationError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} not active")]
    Inactive(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub order: Order,
    pub slot_count: usize,
    pub payment_link: String,
}

pub struct BookingLedger<O, R, N, T> {
    orders: O,
    resources: R,
    notifier: N,
    renderer: T,
    payment_link_base: String,
}

impl<O, R, N, T> BookingLedger<O, R, N, T>
where
    O: OrderStore,
    R: ResourceStore,
    N: Notifier,
    T: TemplateRenderer,
{
    pub fn new(orders: O, resources: R, notifier: N, renderer: T) -> Self {
        Self {
            orders,
            resources,
            notifier,
            renderer,
            payment_link_base: DEFAULT_PAYMENT_LINK_BASE.to_string(),
        }
    }

    pub fn with_payment_link_base(mut self, base: impl Into<String>) -> Self {
        self.payment_link_base = base.into();
        self
    }

    /// Persist a booking order attributed to the context's resource (if any).
    ///
    /// Status is `INITIALIZED`, payment `PENDING`.
    pub fn create_booking_order(
        &self,
        context: &mut BookingContext,
        customer: &Principal,
        draft: BookingDraft,
        now: DateTime<Utc>,
    ) -> Result<Order, LedgerError> {
        let resource_id = context.take();
        let booking = draft.validate()?;

        let order = self.orders.insert(NewOrder {
            customer_id: customer.id,
            total_amount: booking.amount,
            status: OrderStatus::Initialized,
            payment_status: PaymentStatus::Pending,
            resource_id,
            booking_title: Some(booking.title),
            booking_details: booking.details,
            is_booking: true,
            ordered_at: now,
        })?;

        info!(
            order_id = %order.id,
            customer_id = %customer.id,
            resource_id = ?resource_id,
            amount = order.total_amount,
            "booking recorded in order history"
        );
        Ok(order)
    }

    /// Book `slots` on a resource for `customer` and send the confirmation.
    pub fn book_resource(
        &self,
        customer: &Principal,
        resource_id: ResourceId,
        slots: &[BookingSlot],
        now: DateTime<Utc>,
    ) -> Result<BookingReceipt, LedgerError> {
        let resource = self
            .resources
            .get(resource_id)?
            .ok_or(LedgerError::NotFound("resource"))?;
        if !resource.active {
            return Err(LedgerError::Inactive("resource"));
        }
        let amount = booking_amount(resource.price_per_slot, slots)?;

        let mut context = BookingContext::new();
        context.set(Some(resource.id));
        let draft = BookingDraft {
            amount: Some(amount),
            title: Some(booking_title(&resource.name)),
            details: Some(slots_summary(slots)),
        };
        let order = self.create_booking_order(&mut context, customer, draft, now)?;

        let payment_link = format!(
            "{}{}&amount={}",
            self.payment_link_base,
            order.id,
            format_minor(order.total_amount)
        );
        self.send_confirmation(customer, &resource, slots, &order, &payment_link);

        Ok(BookingReceipt {
            order,
            slot_count: slots.len(),
            payment_link,
        })
    }

    fn send_confirmation(
        &self,
        customer: &Principal,
        resource: &Resource,
        slots: &[BookingSlot],
        order: &Order,
        payment_link: &str,
    ) {
        let mut dates: Vec<String> = slots
            .iter()
            .map(|s| s.date.format("%Y-%m-%d").to_string())
            .collect();
        dates.dedup();

        let customer_name = if customer.name.trim().is_empty() {
            "Customer".to_string()
        } else {
            customer.name.clone()
        };
        let context = TemplateContext::from([
            ("customerName", customer_name),
            ("resourceName", resource.name.clone()),
            ("resourceLocation", resource.location.clone().unwrap_or_default()),
            ("date", dates.join(", ")),
            ("slots", slots_summary(slots)),
            ("totalSlots", slots.len().to_string()),
            ("pricePerSlot", format_minor(resource.price_per_slot)),
            ("totalAmount", format_minor(order.total_amount)),
            ("paymentLink", payment_link.to_string()),
            ("orderId", order.id.to_string()),
        ]);

        let body = match self.renderer.render(BOOKING_CONFIRMATION, &context) {
            Ok(body) => body,
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "booking confirmation not rendered");
                return;
            }
        };

        let email = OutboundEmail {
            recipient: customer.email.clone(),
            subject: format!("Booking Confirmation - {}", resource.name),
            body,
            is_html: true,
        };
        if let Err(e) = self.notifier.send_email(&email) {
            warn!(order_id = %order.id, error = %e, "booking confirmation not delivered");
        }
    }
}

/// `1500` -> `"15.00"`
fn format_minor(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use super::*;
    use chrono::TimeZone;
    use slotledger_auth::Role;
    use slotledger_core::{OrderId, Page, PageRequest, PrincipalId};
    use slotledger_orders::ListFilter;

    use crate::notify::{InMemoryOutbox, PlaceholderRenderer};
    use crate::store::{InMemoryOrderStore, InMemoryResourceStore};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn customer() -> Principal {
        Principal::new(PrincipalId::new(3), "Cleo", "cleo@example.com").with_role(Role::Customer)
    }

    fn ledger(
        outbox: Arc<InMemoryOutbox>,
    ) -> (
        BookingLedger<Arc<InMemoryOrderStore>, Arc<InMemoryResourceStore>, Arc<InMemoryOutbox>, PlaceholderRenderer>,
        Arc<InMemoryOrderStore>,
    ) {
        let orders = Arc::new(InMemoryOrderStore::new());
        let resources = Arc::new(InMemoryResourceStore::new());
        resources
            .upsert(Resource::new(ResourceId::new(101), "Court A", 1500))
            .unwrap();
        let ledger = BookingLedger::new(orders.clone(), resources, outbox, PlaceholderRenderer::new());
        (ledger, orders)
    }

    fn slots() -> Vec<BookingSlot> {
        vec![
            BookingSlot::parse("2025-03-02", "10:00", "11:00", 1).unwrap(),
            BookingSlot::parse("2025-03-02", "11:00", "12:00", 1).unwrap(),
        ]
    }

    /// Store whose writes always fail.
    struct BrokenOrders;

    impl OrderStore for BrokenOrders {
        fn get(&self, _: OrderId) -> Result<Option<Order>, StoreError> {
            Ok(None)
        }
        fn insert(&self, _: NewOrder) -> Result<Order, StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
        fn update_status(&self, _: OrderId, _: OrderStatus) -> Result<Order, StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
        fn page(&self, _: &ListFilter, page: PageRequest) -> Result<Page<Order>, StoreError> {
            Ok(Page::empty(page))
        }
        fn by_resource_ids(
            &self,
            _: &BTreeSet<ResourceId>,
            _: Option<OrderStatus>,
        ) -> Result<Vec<Order>, StoreError> {
            Ok(vec![])
        }
        fn legacy_bookings(&self, _: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
            Ok(vec![])
        }
        fn by_customer(&self, _: PrincipalId) -> Result<Vec<Order>, StoreError> {
            Ok(vec![])
        }
    }

    fn draft() -> BookingDraft {
        BookingDraft {
            amount: Some(1500),
            title: Some("Booking: Court A".into()),
            details: None,
        }
    }

    #[test]
    fn booking_order_carries_context_resource_and_clears_it() {
        let (ledger, _) = ledger(Arc::new(InMemoryOutbox::new()));
        let mut ctx = BookingContext::for_resource(ResourceId::new(101));

        let order = ledger.create_booking_order(&mut ctx, &customer(), draft(), t0()).unwrap();
        assert_eq!(order.resource_id, Some(ResourceId::new(101)));
        assert_eq!(order.status, OrderStatus::Initialized);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.is_booking);
        assert_eq!(ctx.current(), None);

        // The next call on the same context is a legacy-style booking.
        let next = ledger.create_booking_order(&mut ctx, &customer(), draft(), t0()).unwrap();
        assert_eq!(next.resource_id, None);
    }

    #[test]
    fn context_is_cleared_when_persistence_fails() {
        let ledger = BookingLedger::new(
            BrokenOrders,
            InMemoryResourceStore::new(),
            InMemoryOutbox::new(),
            PlaceholderRenderer::new(),
        );
        let mut ctx = BookingContext::for_resource(ResourceId::new(101));
        let err = ledger
            .create_booking_order(&mut ctx, &customer(), draft(), t0())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Unavailable(_))));
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn context_is_cleared_when_validation_fails() {
        let (ledger, orders) = ledger(Arc::new(InMemoryOutbox::new()));
        let mut ctx = BookingContext::for_resource(ResourceId::new(101));
        let untitled = BookingDraft {
            title: None,
            ..draft()
        };
        let err = ledger
            .create_booking_order(&mut ctx, &customer(), untitled, t0())
            .unwrap_err();
        assert_eq!(err, LedgerError::Validation(BookingValidationError::MissingTitle));
        assert_eq!(ctx.current(), None);
        assert!(orders.by_customer(customer().id).unwrap().is_empty());
    }

    #[test]
    fn missing_amount_is_rejected_before_persistence() {
        let (ledger, orders) = ledger(Arc::new(InMemoryOutbox::new()));
        let mut ctx = BookingContext::for_resource(ResourceId::new(101));
        let unpriced = BookingDraft {
            amount: None,
            ..draft()
        };
        let err = ledger
            .create_booking_order(&mut ctx, &customer(), unpriced, t0())
            .unwrap_err();
        assert_eq!(err, LedgerError::Validation(BookingValidationError::MissingAmount));
        assert_eq!(ctx.current(), None);
        assert!(orders.by_customer(customer().id).unwrap().is_empty());
    }

    #[test]
    fn book_resource_prices_slots_and_sends_confirmation() {
        let outbox = Arc::new(InMemoryOutbox::new());
        let (ledger, orders) = ledger(outbox.clone());

        let receipt = ledger
            .book_resource(&customer(), ResourceId::new(101), &slots(), t0())
            .unwrap();
        assert_eq!(receipt.slot_count, 2);
        assert_eq!(receipt.order.total_amount, 3000);
        assert_eq!(receipt.order.booking_title.as_deref(), Some("Booking: Court A"));
        assert_eq!(receipt.payment_link, "http://localhost:3000/pay?order=1&amount=30.00");
        assert!(orders.get(receipt.order.id).unwrap().is_some());

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "cleo@example.com");
        assert!(sent[0].is_html);
        assert!(sent[0].body.contains("Hello Cleo"));
        assert!(sent[0].body.contains("30.00"));
    }

    #[test]
    fn confirmation_escapes_customer_supplied_text() {
        let outbox = Arc::new(InMemoryOutbox::new());
        let (ledger, _) = ledger(outbox.clone());
        let mallory = Principal::new(PrincipalId::new(4), "<script>alert(1)</script>", "m@example.com")
            .with_role(Role::Customer);

        ledger
            .book_resource(&mallory, ResourceId::new(101), &slots(), t0())
            .unwrap();
        let body = &outbox.sent()[0].body;
        assert!(!body.contains("<script>"));
        assert!(body.contains("Hello &lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn inactive_resource_cannot_be_booked() {
        let orders = Arc::new(InMemoryOrderStore::new());
        let resources = Arc::new(InMemoryResourceStore::new());
        let mut closed = Resource::new(ResourceId::new(303), "Old Court", 900);
        closed.active = false;
        resources.upsert(closed).unwrap();
        let ledger = BookingLedger::new(
            orders.clone(),
            resources,
            InMemoryOutbox::new(),
            PlaceholderRenderer::new(),
        );

        assert_eq!(
            ledger.book_resource(&customer(), ResourceId::new(303), &slots(), t0()),
            Err(LedgerError::Inactive("resource"))
        );
        assert!(orders.by_customer(customer().id).unwrap().is_empty());
    }

    #[test]
    fn delivery_failure_does_not_undo_the_order() {
        let (ledger, orders) = ledger(Arc::new(InMemoryOutbox::failing()));
        let receipt = ledger
            .book_resource(&customer(), ResourceId::new(101), &slots(), t0())
            .unwrap();
        assert!(orders.get(receipt.order.id).unwrap().is_some());
    }

    #[test]
    fn unknown_resource_is_not_found() {
        let (ledger, _) = ledger(Arc::new(InMemoryOutbox::new()));
        assert_eq!(
            ledger.book_resource(&customer(), ResourceId::new(999), &slots(), t0()),
            Err(LedgerError::NotFound("resource"))
        );
    }

    #[test]
    fn minor_units_render_with_two_decimals() {
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(123456), "1234.56");
    }
}
