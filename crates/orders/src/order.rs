use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use slotledger_core::{Entity, OrderId, PrincipalId, ResourceId};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Initialized,
    Confirmed,
    OnTheWay,
    Delivered,
    Cancelled,
    Failed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Initialized,
        OrderStatus::Confirmed,
        OrderStatus::OnTheWay,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Initialized => "INITIALIZED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::OnTheWay => "ON_THE_WAY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Failed
        )
    }

    /// Forward-only lifecycle used by [`StatusUpdateMode::Strict`].
    ///
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match self {
            Initialized => matches!(next, Confirmed | Cancelled | Failed),
            Confirmed => matches!(next, OnTheWay | Delivered | Cancelled | Failed),
            _ => matches!(next, Delivered | Cancelled | Failed),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(wanted.to_string()))
    }
}

/// How a status update treats the lifecycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusUpdateMode {
    /// Any status may replace any other.
    #[default]
    Permissive,
    /// Only transitions allowed by [`OrderStatus::can_transition_to`].
    Strict,
}

impl StatusUpdateMode {
    pub fn permits(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            StatusUpdateMode::Permissive => true,
            StatusUpdateMode::Strict => from.can_transition_to(to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// A persisted order record.
///
/// An order with `resource_id` set belongs to exactly that resource. A booking
/// order without one is a legacy booking whose resource can only be inferred
/// from `booking_title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: PrincipalId,
    /// Total in smallest currency unit (e.g., cents).
    pub total_amount: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub resource_id: Option<ResourceId>,
    pub booking_title: Option<String>,
    pub booking_details: Option<String>,
    pub is_booking: bool,
    pub ordered_at: DateTime<Utc>,
}

impl Order {
    pub fn is_legacy_booking(&self) -> bool {
        self.resource_id.is_none() && self.is_booking
    }

    /// Case-insensitive substring match against the booking title.
    ///
    /// `needle_lower` must already be lowercase. Orders without a title never match.
    pub fn title_contains(&self, needle_lower: &str) -> bool {
        self.booking_title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(needle_lower))
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// An order not yet persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: PrincipalId,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub resource_id: Option<ResourceId>,
    pub booking_title: Option<String>,
    pub booking_details: Option<String>,
    pub is_booking: bool,
    pub ordered_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            customer_id: self.customer_id,
            total_amount: self.total_amount,
            status: self.status,
            payment_status: self.payment_status,
            resource_id: self.resource_id,
            booking_title: self.booking_title,
            booking_details: self.booking_details,
            is_booking: self.is_booking,
            ordered_at: self.ordered_at,
        }
    }
}
