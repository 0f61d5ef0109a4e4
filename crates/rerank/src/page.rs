//! Incremental client-side pagination.

use serde::{Deserialize, Serialize};

/// Default number of listings revealed per page.
pub const PAGE_SIZE: usize = 9;

/// A growing window over a result list.
///
/// The window starts at one page and grows by a page per `load_more`. It
/// resets to one page whenever the result fingerprint changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    page_size: usize,
    limit: usize,
    fingerprint: Option<u64>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            limit: page_size,
            fingerprint: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of listings shown out of `total`.
    pub fn visible_len(&self, total: usize) -> usize {
        self.limit.min(total)
    }

    /// Whether a "load more" control should be offered.
    pub fn has_more(&self, total: usize) -> bool {
        self.limit < total
    }

    /// Reveal one more page, never past `total`.
    pub fn load_more(&mut self, total: usize) {
        if self.has_more(total) {
            self.limit = (self.limit + self.page_size).min(total);
        }
    }

    pub fn reset(&mut self) {
        self.limit = self.page_size;
    }

    /// Reset when the result set identity changed. Returns whether it did.
    pub fn sync(&mut self, fingerprint: u64) -> bool {
        if self.fingerprint == Some(fingerprint) {
            return false;
        }
        self.fingerprint = Some(fingerprint);
        self.reset();
        true
    }

    /// The visible slice of `items`.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible_len(items.len())]
    }
}
