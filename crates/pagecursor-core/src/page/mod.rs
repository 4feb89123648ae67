//! Cursor-paged results and the assembler that mints their cursors.

mod assemble;
mod source;


pub use assemble::{CursorRecord, PageAssembler};
pub use source::{PaginateError, Paginator, RecordSource};

use crate::{
    cursor::FIRST_PAGE,
    error::Error,
    query::{CursorPolicy, CursorQuery, QueryFilter, QueryType},
};
use serde::{Deserialize, Serialize};

/// `total` value when the caller did not ask for a count.
pub const UNKNOWN_TOTAL: i64 = -1;

///
/// CursorPagination
///
/// One page of records in the query's declared order, with the cursors
/// that reach its neighbours. A missing cursor means no such page exists.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CursorPagination<T> {
    records: Vec<T>,
    total: i64,
    query_size: u32,
    query_type: QueryType,
    page_number: u32,
    prev_cursor: Option<String>,
    next_cursor: Option<String>,
}

impl<T> CursorPagination<T> {
    /// Page with no records, no cursors and an unknown total.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            total: UNKNOWN_TOTAL,
            query_size: 0,
            query_type: QueryType::Fetch,
            page_number: FIRST_PAGE,
            prev_cursor: None,
            next_cursor: None,
        }
    }

    /// Assemble a fetched batch for `query` without a total.
    pub fn of<F: QueryFilter>(
        policy: &CursorPolicy,
        records: Vec<T>,
        query: &CursorQuery<F>,
    ) -> Result<Self, Error>
    where
        T: CursorRecord,
    {
        PageAssembler::new(policy).assemble(None, records, query)
    }

    /// Assemble a fetched batch for `query` carrying a known total.
    pub fn of_with_total<F: QueryFilter>(
        policy: &CursorPolicy,
        total: u64,
        records: Vec<T>,
        query: &CursorQuery<F>,
    ) -> Result<Self, Error>
    where
        T: CursorRecord,
    {
        PageAssembler::new(policy).assemble(Some(total), records, query)
    }

    /// Build a page from already-minted parts.
    #[must_use]
    pub const fn from_parts(
        total: i64,
        records: Vec<T>,
        query_size: u32,
        query_type: QueryType,
        prev_cursor: Option<String>,
        next_cursor: Option<String>,
    ) -> Self {
        Self {
            records,
            total,
            query_size,
            query_type,
            page_number: FIRST_PAGE,
            prev_cursor,
            next_cursor,
        }
    }

    #[must_use]
    pub(crate) const fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Total matching records, or -1 when not counted.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.total
    }

    #[must_use]
    pub fn total_count(&self) -> Option<u64> {
        u64::try_from(self.total).ok()
    }

    #[must_use]
    pub const fn query_size(&self) -> u32 {
        self.query_size
    }

    #[must_use]
    pub const fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Position of this page, 1 being the first.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub fn prev_cursor(&self) -> Option<&str> {
        self.prev_cursor.as_deref()
    }

    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.prev_cursor.is_some()
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.records.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.records.last()
    }

    /// Convert records, keeping cursors and counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CursorPagination<U> {
        CursorPagination {
            records: self.records.into_iter().map(f).collect(),
            total: self.total,
            query_size: self.query_size,
            query_type: self.query_type,
            page_number: self.page_number,
            prev_cursor: self.prev_cursor,
            next_cursor: self.next_cursor,
        }
    }

    /// Query for the following page, if there is one.
    #[must_use]
    pub fn next_query<F: Clone>(&self, query: &CursorQuery<F>) -> Option<CursorQuery<F>> {
        self.next_cursor
            .as_ref()
            .map(|token| query.clone().with_next_cursor(token.clone()))
    }

    /// Query for the preceding page, if there is one.
    #[must_use]
    pub fn prev_query<F: Clone>(&self, query: &CursorQuery<F>) -> Option<CursorQuery<F>> {
        self.prev_cursor
            .as_ref()
            .map(|token| query.clone().with_prev_cursor(token.clone()))
    }
}

impl<T> Default for CursorPagination<T> {
    fn default() -> Self {
        Self::empty()
    }
}
