use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slotledger_auth::Principal;
use slotledger_core::Page;
use slotledger_infra::BookingReceipt;
use slotledger_orders::{Order, OrderStatus, PaymentStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub name: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    /// `yyyy-MM-dd`
    pub date: String,
    pub slots: Vec<SlotRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SlotRequest {
    /// `HH:mm`, 24h
    pub start_time: String,
    pub end_time: String,
    pub unit: Option<u32>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PrincipalView {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub roles: Vec<&'static str>,
}

impl From<&Principal> for PrincipalView {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.get(),
            name: p.name.clone(),
            email: p.email.clone(),
            roles: p.roles.iter().map(|r| r.as_str()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub roles: Vec<&'static str>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: u64,
    pub customer_id: u64,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub resource_id: Option<u64>,
    pub booking_title: Option<String>,
    pub booking_details: Option<String>,
    pub is_booking: bool,
    pub ordered_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(o: Order) -> Self {
        Self {
            id: o.id.get(),
            customer_id: o.customer_id.get(),
            total_amount: o.total_amount,
            status: o.status,
            payment_status: o.payment_status,
            resource_id: o.resource_id.map(|r| r.get()),
            booking_title: o.booking_title,
            booking_details: o.booking_details,
            is_booking: o.is_booking,
            ordered_at: o.ordered_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderPageView {
    pub items: Vec<OrderView>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
    pub page_count: usize,
}

impl From<Page<Order>> for OrderPageView {
    fn from(page: Page<Order>) -> Self {
        let page_count = page.page_count();
        let page = page.map(OrderView::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            size: page.size,
            page_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub order: OrderView,
    pub slot_count: usize,
    pub payment_link: String,
}

impl From<BookingReceipt> for BookingView {
    fn from(r: BookingReceipt) -> Self {
        Self {
            order: r.order.into(),
            slot_count: r.slot_count,
            payment_link: r.payment_link,
        }
    }
}
