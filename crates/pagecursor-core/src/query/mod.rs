//! Cursor query value object.
//!
//! A [`CursorQuery`] is validated against a [`CursorPolicy`] once, at
//! construction, and is immutable afterwards. Navigation to another page
//! produces a new query.

mod canonical;
mod error;
mod order;
mod policy;
mod query_type;


pub use canonical::{CanonicalFields, CanonicalText, QueryFilter};
pub use error::QueryError;
pub use order::{
    DEFAULT_CURSOR_FIELD, DefaultOrderField, OrderDirection, OrderFieldRegistry, OrderSpec,
};
pub use policy::CursorPolicy;
pub use query_type::QueryType;

use crate::{
    cursor::{CursorPosition, codec},
    error::{Error, InternalError},
};

const QUERY_SIZE_FIELD: &str = "query_size";
const QUERY_TYPE_FIELD: &str = "query_type";
const ORDER_FIELDS_FIELD: &str = "order_fields";
const ORDER_TYPES_FIELD: &str = "order_types";

///
/// PageDirection
/// Which way a query moves relative to the page that produced its cursor.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageDirection {
    First,
    Forward,
    Backward,
}

///
/// CursorQuery
///
/// Page size, query type, ordering and at most one inbound navigation
/// cursor, plus caller-defined filter fields `F`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CursorQuery<F = ()> {
    query_size: u32,
    query_type: QueryType,
    order: OrderSpec,
    cursor_field: String,
    prev_cursor: Option<String>,
    next_cursor: Option<String>,
    filter: F,
}

impl CursorQuery {
    /// Start building a query with the policy's default size.
    #[must_use]
    pub fn builder(policy: &CursorPolicy) -> CursorQueryBuilder<'_> {
        CursorQueryBuilder::new(policy)
    }

    /// First page ordered by the cursor field, descending.
    pub fn first(policy: &CursorPolicy, query_size: u32) -> Result<Self, QueryError> {
        Self::builder(policy)
            .query_size(query_size)
            .order_by(policy.cursor_field(), OrderDirection::Desc)
            .build()
    }

    /// Page after the one that produced `next_cursor`, cursor field descending.
    pub fn next(
        policy: &CursorPolicy,
        next_cursor: impl Into<String>,
        query_size: u32,
    ) -> Result<Self, QueryError> {
        Self::builder(policy)
            .query_size(query_size)
            .order_by(policy.cursor_field(), OrderDirection::Desc)
            .next_cursor(next_cursor)
            .build()
    }

    /// Page before the one that produced `prev_cursor`, cursor field descending.
    pub fn prev(
        policy: &CursorPolicy,
        prev_cursor: impl Into<String>,
        query_size: u32,
    ) -> Result<Self, QueryError> {
        Self::builder(policy)
            .query_size(query_size)
            .order_by(policy.cursor_field(), OrderDirection::Desc)
            .prev_cursor(prev_cursor)
            .build()
    }

    pub fn next_default(
        policy: &CursorPolicy,
        next_cursor: impl Into<String>,
    ) -> Result<Self, QueryError> {
        Self::next(policy, next_cursor, policy.default_query_size())
    }

    pub fn prev_default(
        policy: &CursorPolicy,
        prev_cursor: impl Into<String>,
    ) -> Result<Self, QueryError> {
        Self::prev(policy, prev_cursor, policy.default_query_size())
    }

    pub fn asc(policy: &CursorPolicy, field: impl AsRef<str>) -> Result<Self, QueryError> {
        Self::order(policy, field, OrderDirection::Asc)
    }

    pub fn desc(policy: &CursorPolicy, field: impl AsRef<str>) -> Result<Self, QueryError> {
        Self::order(policy, field, OrderDirection::Desc)
    }

    /// First page ordered by `field`. A non-cursor field gets the cursor
    /// field appended as a tie-breaker in the same direction.
    pub fn order(
        policy: &CursorPolicy,
        field: impl AsRef<str>,
        direction: OrderDirection,
    ) -> Result<Self, QueryError> {
        let field = field.as_ref();
        let mut builder = Self::builder(policy).order_by(field, direction);
        if field != policy.cursor_field() {
            builder = builder.order_by(policy.cursor_field(), direction);
        }

        builder.build()
    }

    /// Fully explicit construction; `order_fields` and `order_types` pair up
    /// by position.
    pub fn of<S: AsRef<str>>(
        policy: &CursorPolicy,
        prev_cursor: Option<String>,
        next_cursor: Option<String>,
        query_size: u32,
        query_type: QueryType,
        order_fields: &[S],
        order_types: &[OrderDirection],
    ) -> Result<Self, QueryError> {
        if order_fields.len() != order_types.len() {
            return Err(QueryError::OrderArityMismatch {
                fields: order_fields.len(),
                directions: order_types.len(),
            });
        }

        let mut builder = Self::builder(policy)
            .query_size(query_size)
            .query_type(query_type);
        for (field, direction) in order_fields.iter().zip(order_types) {
            builder = builder.order_by(field, *direction);
        }
        if let Some(token) = prev_cursor {
            builder = builder.prev_cursor(token);
        }
        if let Some(token) = next_cursor {
            builder = builder.next_cursor(token);
        }

        builder.build()
    }
}

impl<F> CursorQuery<F> {
    #[must_use]
    pub const fn query_size(&self) -> u32 {
        self.query_size
    }

    #[must_use]
    pub const fn query_type(&self) -> QueryType {
        self.query_type
    }

    #[must_use]
    pub const fn order_spec(&self) -> &OrderSpec {
        &self.order
    }

    #[must_use]
    pub fn cursor_field(&self) -> &str {
        &self.cursor_field
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
    pub const fn filter(&self) -> &F {
        &self.filter
    }

    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.prev_cursor.is_none() && self.next_cursor.is_none()
    }

    #[must_use]
    pub const fn page_direction(&self) -> PageDirection {
        if self.prev_cursor.is_some() {
            PageDirection::Backward
        } else if self.next_cursor.is_some() {
            PageDirection::Forward
        } else {
            PageDirection::First
        }
    }

    #[must_use]
    pub const fn should_order_by(&self) -> bool {
        !self.order.is_empty()
    }

    /// Whether the cursor field is ordered ascending.
    pub fn cursor_field_is_ascending(&self) -> Result<bool, InternalError> {
        self.order
            .direction_of(&self.cursor_field)
            .map(OrderDirection::is_asc)
            .ok_or_else(|| {
                InternalError::query_invariant(format!(
                    "cursor query must order by '{}'",
                    self.cursor_field
                ))
            })
    }

    /// Attach caller-defined filter fields.
    pub fn with_filter<G>(self, filter: G) -> CursorQuery<G> {
        CursorQuery {
            query_size: self.query_size,
            query_type: self.query_type,
            order: self.order,
            cursor_field: self.cursor_field,
            prev_cursor: self.prev_cursor,
            next_cursor: self.next_cursor,
            filter,
        }
    }

    /// Change the page size, re-checked against the current ceiling.
    pub fn with_query_size(mut self, policy: &CursorPolicy, size: u32) -> Result<Self, QueryError> {
        policy.validate_query_size(size)?;
        self.query_size = size;

        Ok(self)
    }

    /// Same query, moving forward from `next_cursor`.
    #[must_use]
    pub fn with_next_cursor(mut self, next_cursor: impl Into<String>) -> Self {
        self.prev_cursor = None;
        self.next_cursor = Some(next_cursor.into());
        self
    }

    /// Same query, moving backward from `prev_cursor`.
    #[must_use]
    pub fn with_prev_cursor(mut self, prev_cursor: impl Into<String>) -> Self {
        self.prev_cursor = Some(prev_cursor.into());
        self.next_cursor = None;
        self
    }

    /// Same query, back on the first page.
    #[must_use]
    pub fn without_cursors(mut self) -> Self {
        self.prev_cursor = None;
        self.next_cursor = None;
        self
    }
}

impl<F: QueryFilter> CursorQuery<F> {
    /// Every non-navigation field rendered as a sorted `name=value` string.
    pub(crate) fn canonical_string(&self) -> String {
        let mut fields = CanonicalFields::new();
        fields
            .push(QUERY_SIZE_FIELD, &self.query_size)
            .push(QUERY_TYPE_FIELD, &self.query_type)
            .push(ORDER_FIELDS_FIELD, &self.order.field_names().collect::<Vec<_>>())
            .push(
                ORDER_TYPES_FIELD,
                &self.order.directions().collect::<Vec<_>>(),
            );
        self.filter.canonical_fields(&mut fields);

        fields.render()
    }

    /// Page number of the inbound cursor; 1 on the first page.
    pub fn current_page_number(&self) -> Result<u32, Error> {
        codec::current_page_number(self)
    }

    /// Verified position of the inbound prev cursor.
    pub fn prev_position(&self) -> Result<Option<CursorPosition>, Error> {
        self.prev_cursor
            .as_deref()
            .map(|token| codec::decode_cursor(self, token))
            .transpose()
    }

    /// Verified position of the inbound next cursor.
    pub fn next_position(&self) -> Result<Option<CursorPosition>, Error> {
        self.next_cursor
            .as_deref()
            .map(|token| codec::decode_cursor(self, token))
            .transpose()
    }

    pub fn prev_cursor_value(&self) -> Result<Option<String>, Error> {
        Ok(self.prev_position()?.map(|position| position.value))
    }

    pub fn next_cursor_value(&self) -> Result<Option<String>, Error> {
        Ok(self.next_position()?.map(|position| position.value))
    }

    pub fn prev_cursor_number_id(&self) -> Result<Option<i64>, Error> {
        self.prev_position()?
            .map(|position| position.number_id().map_err(Error::from))
            .transpose()
    }

    pub fn next_cursor_number_id(&self) -> Result<Option<i64>, Error> {
        self.next_position()?
            .map(|position| position.number_id().map_err(Error::from))
            .transpose()
    }
}

///
/// CursorQueryBuilder
///

#[derive(Debug)]
pub struct CursorQueryBuilder<'p, F = ()> {
    policy: &'p CursorPolicy,
    query_size: u32,
    query_type: QueryType,
    order: Vec<(String, OrderDirection)>,
    prev_cursor: Option<String>,
    next_cursor: Option<String>,
    filter: F,
}

impl<'p> CursorQueryBuilder<'p> {
    #[must_use]
    pub fn new(policy: &'p CursorPolicy) -> Self {
        Self {
            policy,
            query_size: policy.default_query_size(),
            query_type: QueryType::default(),
            order: Vec::new(),
            prev_cursor: None,
            next_cursor: None,
            filter: (),
        }
    }
}

impl<'p, F> CursorQueryBuilder<'p, F> {
    #[must_use]
    pub fn query_size(mut self, query_size: u32) -> Self {
        self.query_size = query_size;
        self
    }

    #[must_use]
    pub fn query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = query_type;
        self
    }

    /// Append one ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, field: impl AsRef<str>, direction: OrderDirection) -> Self {
        self.order.push((field.as_ref().to_string(), direction));
        self
    }

    #[must_use]
    pub fn prev_cursor(mut self, token: impl Into<String>) -> Self {
        self.prev_cursor = Some(token.into());
        self
    }

    #[must_use]
    pub fn next_cursor(mut self, token: impl Into<String>) -> Self {
        self.next_cursor = Some(token.into());
        self
    }

    pub fn filter<G>(self, filter: G) -> CursorQueryBuilder<'p, G> {
        CursorQueryBuilder {
            policy: self.policy,
            query_size: self.query_size,
            query_type: self.query_type,
            order: self.order,
            prev_cursor: self.prev_cursor,
            next_cursor: self.next_cursor,
            filter,
        }
    }

    pub fn build(self) -> Result<CursorQuery<F>, QueryError> {
        let policy = self.policy;
        let order = OrderSpec::new(self.order);

        policy.validate_query_size(self.query_size)?;
        policy.validate_order(&order)?;
        if self.prev_cursor.is_some() && self.next_cursor.is_some() {
            return Err(QueryError::ConflictingCursors);
        }

        Ok(CursorQuery {
            query_size: self.query_size,
            query_type: self.query_type,
            order,
            cursor_field: policy.cursor_field().to_string(),
            prev_cursor: self.prev_cursor,
            next_cursor: self.next_cursor,
            filter: self.filter,
        })
    }
}
