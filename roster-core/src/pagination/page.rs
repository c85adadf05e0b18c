use serde::Serialize;
use thiserror::Error;

use super::direction::Direction;

/// Default number of rows per page when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationRequestError {
    #[error("invalid direction '{value}', expected NEXT or PREVIOUS")]
    InvalidDirection { value: String },
    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: i64, max: usize },
}

/// Rows that can be paged by a stable, unique, totally ordered id.
pub trait Keyed {
    fn key(&self) -> i64;
}

/// Validated paging request. `limit` is always within `1..=max_limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub filter: F,
    pub last_id: Option<i64>,
    pub limit: usize,
    pub direction: Direction,
}

impl<F> PageRequest<F> {
    pub fn new(
        filter: F,
        last_id: Option<i64>,
        limit: i64,
        direction: Direction,
        max_limit: usize,
    ) -> Result<Self, PaginationRequestError> {
        let limit = usize::try_from(limit)
            .ok()
            .filter(|value| (1..=max_limit).contains(value))
            .ok_or(PaginationRequestError::InvalidLimit {
                limit,
                max: max_limit,
            })?;

        Ok(Self {
            filter,
            last_id,
            limit,
            direction,
        })
    }

    /// The over-fetching window handed to the row source.
    pub fn window(&self) -> KeysetWindow {
        KeysetWindow {
            last_id: self.last_id,
            fetch_limit: self.limit.saturating_add(1),
            direction: self.direction,
        }
    }
}

/// What a row source must return: up to `fetch_limit` rows strictly past
/// `last_id` in `direction` order (ascending for NEXT, descending for
/// PREVIOUS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetWindow {
    pub last_id: Option<i64>,
    pub fetch_limit: usize,
    pub direction: Direction,
}

/// One page of rows plus the cursors needed to move from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetPage<T> {
    pub content: Vec<T>,
    pub next_id: Option<i64>,
    pub previous_id: Option<i64>,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> KeysetPage<T> {
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            next_id: None,
            previous_id: None,
            has_next: false,
            has_previous: false,
        }
    }
}
