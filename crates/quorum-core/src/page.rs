//! Pagination wire contract and count arithmetic.
//!
//! Every list endpoint responds with `{ data, meta }` where `meta` carries
//! camelCase pagination fields (`totalItems`, `hasNextPage`, ...). The
//! same shape is what the cache stores for list views, so optimistic
//! projections edit these structures in place.
//!
//! Count arithmetic keeps two invariants at all times:
//!
//! - `total_pages >= 1`, even for an empty result set, so a "page 0 of 0"
//!   display state is unrepresentable;
//! - `has_next_page` / `has_prev_page` are always consistent with
//!   `page` and `total_pages`.

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// 1-based page number of this view.
    pub page: u64,
    /// Maximum rows per page.
    pub limit: u64,
    /// Total rows across all pages.
    pub total_items: u64,
    /// Total pages, floored at 1.
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    /// Build metadata for the given position and total, deriving
    /// `total_pages` and the navigation flags.
    pub fn new(page: u64, limit: u64, total_items: u64) -> Self {
        let mut meta = Self {
            page,
            limit,
            total_items,
            total_pages: 1,
            has_next_page: false,
            has_prev_page: false,
        };
        meta.recount(total_items);
        meta
    }

    /// Set `total_items` and rederive `total_pages` and the navigation
    /// flags. `total_pages` is floored at 1.
    pub fn recount(&mut self, total_items: u64) {
        self.total_items = total_items;
        self.total_pages = if self.limit == 0 {
            1
        } else {
            total_items.div_ceil(self.limit).max(1)
        };
        self.has_next_page = self.page < self.total_pages;
        self.has_prev_page = self.page > 1;
    }

    /// Record one additional row in the totals.
    pub fn add_item(&mut self) {
        self.recount(self.total_items + 1);
    }

    /// Record one removed row in the totals, saturating at zero.
    pub fn remove_item(&mut self) {
        self.recount(self.total_items.saturating_sub(1));
    }
}

/// One page of rows plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// An empty first page with the given row limit.
    pub fn empty(limit: u64) -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::new(1, limit, 0),
        }
    }

    /// Returns `true` if this is the first page of its view.
    pub fn is_first(&self) -> bool {
        self.meta.page <= 1
    }

    /// Insert a row at the front of this page and bump the totals.
    ///
    /// The page keeps at most `limit` rows: when full, the last row falls
    /// off (it still exists server-side on the next page). Only first
    /// pages should receive the row itself; non-first pages take
    /// [`PageMeta::add_item`] alone, because the new row conceptually
    /// belongs on page 1.
    pub fn insert_first(&mut self, row: T) {
        self.data.insert(0, row);
        if self.meta.limit > 0 && self.data.len() as u64 > self.meta.limit {
            self.data.truncate(self.meta.limit as usize);
        }
        self.meta.add_item();
    }

    /// Remove every row matching the predicate, decrementing the totals
    /// once per removed row. Returns the number of rows removed.
    pub fn remove_where<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.data.len();
        self.data.retain(|row| !pred(row));
        let removed = before - self.data.len();
        for _ in 0..removed {
            self.meta.remove_item();
        }
        removed
    }

    /// Replace the first row matching the predicate. Returns `true` if a
    /// row was replaced. Totals are unchanged.
    pub fn replace_where<F: FnMut(&T) -> bool>(&mut self, mut pred: F, row: T) -> bool {
        if let Some(slot) = self.data.iter_mut().find(|r| pred(r)) {
            *slot = row;
            true
        } else {
            false
        }
    }
}
