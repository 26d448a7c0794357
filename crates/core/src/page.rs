//! Offset pagination primitives.

use serde::{Deserialize, Serialize};

/// Zero-based page request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub const fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Offset of the first item on this page, saturating instead of overflowing.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Clamp the page size into `1..=max_size`.
    pub fn clamped(self, max_size: usize) -> Self {
        Self {
            page: self.page,
            size: self.size.clamp(1, max_size.max(1)),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

/// One page of an ordered result set.
///
/// `total` is the size of the whole (filtered) sequence the page was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page,
            size: request.size,
        }
    }

    /// Cut a page out of an already ordered sequence.
    ///
    /// `from = min(page * size, len)`, `to = min(from + size, len)`.
    pub fn slice(mut all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let from = request.offset().min(total);
        let to = from.saturating_add(request.size).min(total);
        all.truncate(to);
        let items = all.split_off(from);
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
        }
    }

    /// Number of pages needed to cover `total` items.
    pub fn page_count(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}
