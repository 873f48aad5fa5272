//! Offset pagination primitives shared by list endpoints.
//!
//! Listings are addressed by `limit`/`offset`. Callers may ask for any
//! offset; one past the end of the collection simply yields an empty page.
//! The page size, however, is always clamped to a configured ceiling so a
//! single request cannot ask for an unbounded number of rows.

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Ceiling applied when the caller does not configure one.
pub const DEFAULT_MAX_LIMIT: u32 = 100;

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `limit` was negative.
    #[error("limit must not be negative (got {value})")]
    NegativeLimit {
        /// Raw value received from the caller.
        value: i64,
    },
    /// `offset` was negative.
    #[error("offset must not be negative (got {value})")]
    NegativeOffset {
        /// Raw value received from the caller.
        value: i64,
    },
    /// The configured ceiling was zero.
    #[error("maximum page size must be at least 1")]
    ZeroMaximum,
}

/// Validated `limit`/`offset` pair.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let page = PageRequest::new(Some(500), Some(40), 100).expect("valid page");
/// assert_eq!(page.limit(), 100);
/// assert_eq!(page.offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Build a request from optional raw values.
    ///
    /// Missing values fall back to [`DEFAULT_LIMIT`] and zero. A zero limit is
    /// raised to one and anything above `max_limit` is lowered to it.
    ///
    /// # Errors
    /// Returns [`PaginationError`] for negative inputs or a zero ceiling.
    pub fn new(
        limit: Option<i64>,
        offset: Option<i64>,
        max_limit: u32,
    ) -> Result<Self, PaginationError> {
        if max_limit == 0 {
            return Err(PaginationError::ZeroMaximum);
        }

        let raw_limit = limit.unwrap_or(i64::from(DEFAULT_LIMIT));
        if raw_limit < 0 {
            return Err(PaginationError::NegativeLimit { value: raw_limit });
        }
        let raw_offset = offset.unwrap_or(0);
        let offset =
            u64::try_from(raw_offset).map_err(|_| PaginationError::NegativeOffset { value: raw_offset })?;

        let clamped = raw_limit.clamp(1, i64::from(max_limit));
        let limit = u32::try_from(clamped).unwrap_or(max_limit);

        Ok(Self { limit, offset })
    }

    /// Number of items requested.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Slice an in-memory, already ordered collection.
    ///
    /// Out-of-range offsets produce an empty vector.
    #[must_use]
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.iter().skip(start).take(take).cloned().collect()
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page in listing order.
    pub items: Vec<T>,
    /// Effective page size after clamping.
    pub limit: u32,
    /// Offset the page starts at.
    pub offset: u64,
}

impl<T> Page<T> {
    /// Wrap `items` with the request that produced them.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self {
            items,
            limit: request.limit,
            offset: request.offset,
        }
    }

    /// Transform every item while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Clamping and slicing behaviour.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 100, DEFAULT_LIMIT, 0)]
    #[case(Some(0), None, 100, 1, 0)]
    #[case(Some(50), Some(10), 100, 50, 10)]
    #[case(Some(10_000), Some(3), 100, 100, 3)]
    #[case(Some(30), None, 25, 25, 0)]
    fn clamps_limit_into_range(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] max: u32,
        #[case] expected_limit: u32,
        #[case] expected_offset: u64,
    ) {
        let page = PageRequest::new(limit, offset, max).expect("valid request");
        assert_eq!(page.limit(), expected_limit);
        assert_eq!(page.offset(), expected_offset);
    }

    #[rstest]
    #[case(Some(-1), None, PaginationError::NegativeLimit { value: -1 })]
    #[case(None, Some(-5), PaginationError::NegativeOffset { value: -5 })]
    fn rejects_negative_values(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected: PaginationError,
    ) {
        let err = PageRequest::new(limit, offset, 100).expect_err("negative input");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn rejects_zero_maximum() {
        let err = PageRequest::new(None, None, 0).expect_err("zero ceiling");
        assert_eq!(err, PaginationError::ZeroMaximum);
    }

    #[rstest]
    fn offset_past_end_yields_empty_page() {
        let page = PageRequest::new(Some(5), Some(99), 100).expect("valid request");
        assert!(page.apply(&[1, 2, 3]).is_empty());
    }

    #[rstest]
    fn apply_slices_in_order() {
        let page = PageRequest::new(Some(2), Some(1), 100).expect("valid request");
        assert_eq!(page.apply(&["a", "b", "c", "d"]), vec!["b", "c"]);
    }

    #[rstest]
    fn page_serialises_metadata() {
        let request = PageRequest::new(Some(2), Some(4), 100).expect("valid request");
        let page = Page::new(vec![1, 2], request).map(|n| n * 10);
        let json = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(json["items"], serde_json::json!([10, 20]));
        assert_eq!(json["limit"], 2);
        assert_eq!(json["offset"], 4);
    }
}
