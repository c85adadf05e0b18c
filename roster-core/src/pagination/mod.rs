//! Bidirectional keyset pagination.
//!
//! A page is assembled from at most `limit + 1` rows fetched past a cursor.
//! The extra row only signals that more rows exist in the scan direction and
//! is never returned. No count query is ever issued.

mod direction;
mod engine;
mod page;

pub use direction::Direction;
pub use engine::{assemble_page, paginate};
pub use page::{
    DEFAULT_PAGE_LIMIT, KeysetPage, KeysetWindow, Keyed, PageRequest,
    PaginationRequestError,
};
