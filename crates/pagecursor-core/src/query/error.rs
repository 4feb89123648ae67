use thiserror::Error as ThisError;

///
/// QueryError
/// Validation failures for a cursor query's shape.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("query size must be greater than 0")]
    QuerySizeZero,

    #[error("query size {size} exceeds the maximum of {max}")]
    QuerySizeExceedsMax { size: u32, max: u32 },

    #[error("max query size must be greater than 0")]
    MaxQuerySizeZero,

    #[error("order fields must not be empty")]
    EmptyOrderFields,

    #[error("order arity mismatch: {fields} fields but {directions} directions")]
    OrderArityMismatch { fields: usize, directions: usize },

    #[error("order field '{field}' is not allowed")]
    OrderFieldNotAllowed { field: String },

    #[error("order field '{field}' is listed more than once")]
    DuplicateOrderField { field: String },

    #[error("cursor queries must order by '{field}'")]
    MissingCursorField { field: String },

    #[error("prev cursor and next cursor must not both be set")]
    ConflictingCursors,
}
