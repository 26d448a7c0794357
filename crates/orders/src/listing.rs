//! Merging the resource-tagged and legacy order sources into one listing.

use serde::Deserialize;

use slotledger_core::Entity;

use crate::{LegacyOrderMatcher, ManagedScope, Order, OrderStatus};

/// Optional listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of the booking title.
    pub name: Option<String>,
}

impl ListFilter {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            name: None,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            status: None,
            name: Some(name.into()),
        }
    }

    /// The lowercase name needle, or `None` when the name filter is absent or blank.
    pub fn name_needle(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }
        match self.name_needle() {
            Some(needle) => order.title_contains(&needle),
            None => true,
        }
    }
}

/// Combine both sources into one sequence: legacy orders are kept only when
/// `matcher` accepts them, the result is sorted by id descending and holds
/// each id once.
pub fn merge_sources<M>(
    scoped: Vec<Order>,
    legacy: Vec<Order>,
    scope: &ManagedScope,
    matcher: &M,
) -> Vec<Order>
where
    M: LegacyOrderMatcher + ?Sized,
{
    let mut merged = scoped;
    merged.extend(legacy.into_iter().filter(|o| matcher.matches(o, scope)));
    merged.sort_by_key(|o| std::cmp::Reverse(o.id()));
    merged.dedup_by_key(|o| o.id());
    merged
}

/// Keep only orders whose booking title contains the filter's name,
/// case-insensitively. The status part of `filter` is not applied here.
///
/// A missing or blank name keeps everything.
pub fn apply_name_filter(orders: Vec<Order>, filter: &ListFilter) -> Vec<Order> {
    let Some(needle) = filter.name_needle() else {
        return orders;
    };
    orders
        .into_iter()
        .filter(|o| o.title_contains(&needle))
        .collect()
}
