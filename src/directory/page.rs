//! Pagination over already-filtered lists

use serde::{Deserialize, Serialize};

/// Default page size of every listing
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a client may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// How many page links a pager shows at once
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Requested page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Clamp to the accepted ranges: page >= 1, 1 <= limit <= MAX_PAGE_SIZE
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Convert the items while keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Number of pages needed for `total` items; never less than one
pub fn total_pages(total: usize, limit: usize) -> usize {
    let limit = limit.max(1);
    total.div_ceil(limit).max(1)
}

/// Cut one page out of `items`.
///
/// A page past the end is clamped to the last page, so a listing that shrank
/// under the client (e.g. after a delete) still returns rows.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let request = request.normalized();
    let total = items.len();
    let total_pages = total_pages(total, request.limit);
    let page = request.page.min(total_pages);

    let start = (page - 1) * request.limit;
    let items: Vec<T> = items.into_iter().skip(start).take(request.limit).collect();

    Page {
        items,
        total,
        page,
        limit: request.limit,
        total_pages,
    }
}

/// Page numbers a pager should render around `current`.
///
/// The window holds at most `max_visible` pages, is centred on `current` when
/// possible and is shifted back near the end so it stays full.
pub fn visible_pages(current: usize, total_pages: usize, max_visible: usize) -> Vec<usize> {
    if total_pages == 0 || max_visible == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let half = max_visible / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + max_visible - 1).min(total_pages);

    if end - start < max_visible - 1 {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }

    (start..=end).collect()
}
