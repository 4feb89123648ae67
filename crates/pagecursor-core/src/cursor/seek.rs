use crate::{
    cursor::{CursorPosition, codec::inbound_position},
    error::Error,
    query::{CursorPolicy, CursorQuery, OrderSpec, PageDirection, QueryFilter},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// SeekOp
/// Keyset comparison applied to the cursor field.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeekOp {
    Gt,
    Lt,
}

impl SeekOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// True when a row comparing as `ordering` against the anchor is past it.
    #[must_use]
    pub const fn admits(self, ordering: Ordering) -> bool {
        matches!(
            (self, ordering),
            (Self::Gt, Ordering::Greater) | (Self::Lt, Ordering::Less)
        )
    }

    const fn inverted(self) -> Self {
        match self {
            Self::Gt => Self::Lt,
            Self::Lt => Self::Gt,
        }
    }
}

impl fmt::Display for SeekOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

///
/// KeysetSeek
///
/// Fetch instruction handed to the repository:
/// `WHERE cursor_field <comparison> anchor ORDER BY fetch_order LIMIT limit`.
///
/// Backward pages invert both the comparison and the order, so the
/// repository returns them nearest-first; the assembler restores the
/// declared order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeysetSeek {
    pub direction: PageDirection,
    pub cursor_field: String,
    pub anchor: Option<CursorPosition>,
    pub comparison: SeekOp,
    pub fetch_order: OrderSpec,
    pub limit: u32,
}

impl KeysetSeek {
    /// Verify the query's inbound cursor and derive the fetch instruction.
    pub fn for_query<F: QueryFilter>(
        policy: &CursorPolicy,
        query: &CursorQuery<F>,
    ) -> Result<Self, Error> {
        let anchor = inbound_position(query)?;
        let forward = if query.cursor_field_is_ascending()? {
            SeekOp::Gt
        } else {
            SeekOp::Lt
        };
        let direction = query.page_direction();

        let (comparison, fetch_order) = match direction {
            PageDirection::First | PageDirection::Forward => {
                (forward, query.order_spec().clone())
            }
            PageDirection::Backward => (forward.inverted(), query.order_spec().reversed()),
        };

        Ok(Self {
            direction,
            cursor_field: query.cursor_field().to_string(),
            anchor,
            comparison,
            fetch_order,
            limit: policy.end_detection().fetch_limit(query.query_size()),
        })
    }

    /// Anchor value, absent on the first page.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.anchor.as_ref().map(|anchor| anchor.value.as_str())
    }
}
