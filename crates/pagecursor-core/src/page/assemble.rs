use crate::{
    config::EndDetection,
    cursor::{FIRST_PAGE, codec},
    error::{Error, InternalError},
    obs::sink::{CursorEvent, CursorKind, record},
    page::{CursorPagination, UNKNOWN_TOTAL},
    query::{CursorPolicy, CursorQuery, PageDirection, QueryFilter},
};

///
/// CursorRecord
///
/// A fetched row that can report its cursor-field value. `None` means the
/// value was not loaded, which fails cursor minting.
///

pub trait CursorRecord {
    fn cursor_value(&self) -> Option<String>;
}

impl<T: CursorRecord + ?Sized> CursorRecord for &T {
    fn cursor_value(&self) -> Option<String> {
        (**self).cursor_value()
    }
}

///
/// PageAssembler
///
/// Turns a fetched batch into a [`CursorPagination`], restoring canonical
/// order for backward pages and minting the neighbour cursors.
///

#[derive(Clone, Copy, Debug)]
pub struct PageAssembler<'a> {
    policy: &'a CursorPolicy,
}

impl<'a> PageAssembler<'a> {
    #[must_use]
    pub const fn new(policy: &'a CursorPolicy) -> Self {
        Self { policy }
    }

    /// Assemble `records` as fetched for `query`.
    ///
    /// Backward batches must arrive nearest-first (reverse canonical order).
    /// Under look-ahead the batch may hold one row beyond the page size; that
    /// row only signals that more data exists and is dropped.
    pub fn assemble<T, F>(
        &self,
        total: Option<u64>,
        records: Vec<T>,
        query: &CursorQuery<F>,
    ) -> Result<CursorPagination<T>, Error>
    where
        T: CursorRecord,
        F: QueryFilter,
    {
        self.assemble_at(total, records, query, None)
    }

    // `known_page` skips re-verifying a cursor the caller already decoded.
    pub(crate) fn assemble_at<T, F>(
        &self,
        total: Option<u64>,
        mut records: Vec<T>,
        query: &CursorQuery<F>,
        known_page: Option<u32>,
    ) -> Result<CursorPagination<T>, Error>
    where
        T: CursorRecord,
        F: QueryFilter,
    {
        let direction = query.page_direction();

        if records.is_empty() {
            record(CursorEvent::PageAssembled {
                direction,
                records: 0,
                reached_end: true,
            });
            tracing::debug!(?direction, "assembled empty page");

            return Ok(CursorPagination::from_parts(
                UNKNOWN_TOTAL,
                records,
                query.query_size(),
                query.query_type(),
                None,
                None,
            ));
        }

        let size = usize::try_from(query.query_size())
            .map_err(|_| InternalError::assembler_invariant("query size does not fit usize"))?;
        let reached_end = match self.policy.end_detection() {
            EndDetection::LookAhead => records.len() <= size,
            EndDetection::SizeCompare => records.len() < size,
        };

        // trim before reversing: the extra row is the farthest one
        records.truncate(size);
        if direction == PageDirection::Backward {
            records.reverse();
        }

        let current_page = match known_page {
            Some(page) => page,
            None => codec::current_page_number(query)?,
        };
        let first = records.first().and_then(CursorRecord::cursor_value);
        let last = records.last().and_then(CursorRecord::cursor_value);

        let (prev_cursor, next_cursor, page_number) = match direction {
            PageDirection::First => {
                let next = if reached_end {
                    None
                } else {
                    Some(mint_next(query, last.as_deref(), current_page)?)
                };

                (None, next, current_page)
            }
            PageDirection::Forward => {
                let prev = codec::mint(query, CursorKind::Prev, first.as_deref(), current_page)?;
                let next = if reached_end {
                    None
                } else {
                    Some(mint_next(query, last.as_deref(), current_page)?)
                };

                (Some(prev), next, current_page)
            }
            PageDirection::Backward => {
                let shown = current_page.saturating_sub(1).max(FIRST_PAGE);
                let next = codec::mint(query, CursorKind::Next, last.as_deref(), current_page)?;
                let prev = if reached_end || shown <= FIRST_PAGE {
                    None
                } else {
                    Some(codec::mint(
                        query,
                        CursorKind::Prev,
                        first.as_deref(),
                        shown,
                    )?)
                };

                (prev, Some(next), shown)
            }
        };

        let total = match total {
            Some(total) => i64::try_from(total)
                .map_err(|_| InternalError::assembler_invariant("total count exceeds i64"))?,
            None => UNKNOWN_TOTAL,
        };

        record(CursorEvent::PageAssembled {
            direction,
            records: records.len() as u64,
            reached_end,
        });
        tracing::debug!(
            ?direction,
            page_number,
            records = records.len(),
            reached_end,
            "assembled page"
        );

        Ok(CursorPagination::from_parts(
            total,
            records,
            query.query_size(),
            query.query_type(),
            prev_cursor,
            next_cursor,
        )
        .with_page_number(page_number))
    }
}

fn mint_next<F: QueryFilter>(
    query: &CursorQuery<F>,
    value: Option<&str>,
    current_page: u32,
) -> Result<String, Error> {
    let page = current_page
        .checked_add(1)
        .ok_or_else(|| InternalError::assembler_invariant("page number overflow"))?;

    codec::mint(query, CursorKind::Next, value, page)
}
