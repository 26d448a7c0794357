use serde::{Deserialize, Serialize};

/// A single thing a principal is allowed to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// See every order, unscoped.
    ViewAllOrders,
    /// Change the status of any order.
    UpdateAnyOrder,
    /// See orders belonging to resources the principal manages.
    ViewManagedOrders,
    /// Change the status of orders belonging to managed resources.
    UpdateManagedOrder,
    /// Reserve a resource (creates a booking order).
    PlaceBooking,
    /// See the principal's own order history.
    ViewOwnOrders,
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Capability::ViewAllOrders => "orders.view_all",
            Capability::UpdateAnyOrder => "orders.update_any",
            Capability::ViewManagedOrders => "orders.view_managed",
            Capability::UpdateManagedOrder => "orders.update_managed",
            Capability::PlaceBooking => "bookings.place",
            Capability::ViewOwnOrders => "orders.view_own",
        };
        f.write_str(name)
    }
}
