//! Booking requests and the per-request booking context.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use slotledger_core::ResourceId;

/// Resource a booking order should be attributed to.
///
/// Owned by a single request and passed by `&mut` down the call chain, so it
/// can never be observed by another request. The order writer `take`s it,
/// leaving the context empty whatever the outcome of the write.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BookingContext {
    resource_id: Option<ResourceId>,
}

impl BookingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_resource(resource_id: ResourceId) -> Self {
        Self {
            resource_id: Some(resource_id),
        }
    }

    pub fn set(&mut self, resource_id: Option<ResourceId>) {
        self.resource_id = resource_id;
    }

    pub fn current(&self) -> Option<ResourceId> {
        self.resource_id
    }

    pub fn take(&mut self) -> Option<ResourceId> {
        self.resource_id.take()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingValidationError {
    #[error("booking amount is required")]
    MissingAmount,

    #[error("booking title is required")]
    MissingTitle,

    #[error("date must be yyyy-MM-dd, got '{0}'")]
    InvalidDate(String),

    #[error("time must be HH:mm, got '{0}'")]
    InvalidTime(String),

    #[error("slot end {end} is not after start {start}")]
    EmptyTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("slot unit must be positive")]
    InvalidUnit,

    #[error("at least one slot is required")]
    NoSlots,

    #[error("booking amount overflows")]
    AmountOverflow,
}

/// One reserved time window on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub unit: u32,
}

impl BookingSlot {
    pub fn parse(date: &str, start: &str, end: &str, unit: u32) -> Result<Self, BookingValidationError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| BookingValidationError::InvalidDate(date.to_string()))?;
        let start = parse_time(start)?;
        let end = parse_time(end)?;
        if end <= start {
            return Err(BookingValidationError::EmptyTimeRange { start, end });
        }
        if unit == 0 {
            return Err(BookingValidationError::InvalidUnit);
        }
        Ok(Self {
            date,
            start,
            end,
            unit,
        })
    }

    /// e.g. `2025-03-01 10:00-11:00 (unit 1)`
    pub fn summary(&self) -> String {
        format!(
            "{} {}-{} (unit {})",
            self.date.format("%Y-%m-%d"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.unit
        )
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, BookingValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| BookingValidationError::InvalidTime(raw.to_string()))
}

/// Title used for orders created from a resource booking.
pub fn booking_title(resource_name: &str) -> String {
    format!("Booking: {}", resource_name.trim())
}

/// Human readable, one line per slot.
pub fn slots_summary(slots: &[BookingSlot]) -> String {
    slots
        .iter()
        .map(BookingSlot::summary)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `price_per_slot * slots`, in minor units.
pub fn booking_amount(price_per_slot: u64, slots: &[BookingSlot]) -> Result<u64, BookingValidationError> {
    if slots.is_empty() {
        return Err(BookingValidationError::NoSlots);
    }
    let count = u64::try_from(slots.len()).map_err(|_| BookingValidationError::AmountOverflow)?;
    price_per_slot
        .checked_mul(count)
        .ok_or(BookingValidationError::AmountOverflow)
}

/// Unvalidated input of a booking order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub amount: Option<u64>,
    pub title: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub amount: u64,
    pub title: String,
    pub details: Option<String>,
}

impl BookingDraft {
    pub fn validate(self) -> Result<ValidBooking, BookingValidationError> {
        let amount = self.amount.ok_or(BookingValidationError::MissingAmount)?;
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(BookingValidationError::MissingTitle)?;
        let details = self
            .details
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(ValidBooking {
            amount,
            title,
            details,
        })
    }
}
