use crate::{
    cursor::{FIRST_PAGE, KeysetSeek},
    error::Error,
    page::{CursorPagination, CursorRecord, PageAssembler, UNKNOWN_TOTAL},
    query::{CursorPolicy, CursorQuery, QueryFilter},
};
use thiserror::Error as ThisError;

///
/// RecordSource
///
/// Fetch collaborator for a record store. `fetch` must honour the seek
/// instruction exactly: rows past the anchor, in `fetch_order`, at most
/// `limit` of them.
///

pub trait RecordSource<F = ()> {
    type Record: CursorRecord;
    type Error;

    fn fetch(
        &self,
        query: &CursorQuery<F>,
        seek: &KeysetSeek,
    ) -> Result<Vec<Self::Record>, Self::Error>;

    /// Total rows matching the query's filter, if the source can count.
    fn count_total(&self, _query: &CursorQuery<F>) -> Result<Option<u64>, Self::Error> {
        Ok(None)
    }
}

///
/// PaginateError
///

#[derive(Debug, ThisError)]
pub enum PaginateError<E> {
    #[error(transparent)]
    Cursor(#[from] Error),

    #[error("record source failed: {0}")]
    Source(#[source] E),
}

impl<E> PaginateError<E> {
    /// True when the failure was caused by the request rather than the store.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Cursor(err) => err.is_client_error(),
            Self::Source(_) => false,
        }
    }
}

///
/// Paginator
///
/// Runs one page request end to end: verify the inbound cursor, derive the
/// seek, fetch and count as the query type asks, then assemble.
///

#[derive(Clone, Copy, Debug)]
pub struct Paginator<'p> {
    policy: &'p CursorPolicy,
}

impl<'p> Paginator<'p> {
    #[must_use]
    pub const fn new(policy: &'p CursorPolicy) -> Self {
        Self { policy }
    }

    /// Verify the query's cursor and derive the fetch instruction.
    pub fn seek<F: QueryFilter>(&self, query: &CursorQuery<F>) -> Result<KeysetSeek, Error> {
        KeysetSeek::for_query(self.policy, query)
    }

    pub fn paginate<F, S>(
        &self,
        source: &S,
        query: &CursorQuery<F>,
    ) -> Result<CursorPagination<S::Record>, PaginateError<S::Error>>
    where
        F: QueryFilter,
        S: RecordSource<F>,
    {
        let seek = self.seek(query)?;
        let current_page = seek
            .anchor
            .as_ref()
            .map_or(FIRST_PAGE, |anchor| anchor.page_number);

        let query_type = query.query_type();
        let total = if query_type.should_count_total() {
            source.count_total(query).map_err(PaginateError::Source)?
        } else {
            None
        };

        if !query_type.should_fetch() {
            let total = total
                .and_then(|total| i64::try_from(total).ok())
                .unwrap_or(UNKNOWN_TOTAL);
            tracing::debug!(total, "count-only page");

            return Ok(CursorPagination::from_parts(
                total,
                Vec::new(),
                query.query_size(),
                query_type,
                None,
                None,
            ));
        }

        let records = source.fetch(query, &seek).map_err(PaginateError::Source)?;
        tracing::debug!(
            direction = ?seek.direction,
            limit = seek.limit,
            fetched = records.len(),
            "fetched page batch"
        );

        let page = PageAssembler::new(self.policy).assemble_at(
            total,
            records,
            query,
            Some(current_page),
        )?;

        Ok(page)
    }
}
