//! Listing helpers
//!
//! Every admin screen lists a fetched collection through the same two steps:
//!
//! ```text
//! all rows → filter (search, role / status) → paginate (page, limit) → Page<T>
//! ```
//!
//! - [`filter`]: `UserFilter` and `LeadFilter`
//! - [`page`]: `PageRequest`, `Page`, `paginate`, `visible_pages`

mod filter;
mod page;

pub use filter::{LeadFilter, LeadFilterParams, UserFilter, UserFilterParams};
pub use page::{
    paginate, total_pages, visible_pages, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    MAX_VISIBLE_PAGES,
};
