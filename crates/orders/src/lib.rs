//! Orders and bookable resources (pure domain).
//!
//! This crate contains the business rules deciding who may see or mutate an
//! order, how two generations of order data are merged into one listing, and
//! how a booking request is turned into an order draft. No IO, no HTTP, no
//! storage.

pub mod booking;
pub mod listing;
pub mod order;
pub mod resource;
pub mod visibility;

pub use booking::{
    BookingContext, BookingDraft, BookingSlot, BookingValidationError, ValidBooking, booking_amount,
    booking_title, slots_summary,
};
pub use listing::{ListFilter, apply_name_filter, merge_sources};
pub use order::{NewOrder, Order, OrderStatus, PaymentStatus, StatusUpdateMode, UnknownStatus};
pub use resource::Resource;
pub use visibility::{
    AccessDenied, LegacyOrderMatcher, ManagedScope, OrderScope, TitleContainsMatcher, VisibilityPolicy,
    order_scope,
};
