use thiserror::Error as ThisError;

///
/// CursorDecodeError
/// Structural failures of an untrusted cursor token.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CursorDecodeError {
    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token exceeds max length: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("cursor token is not valid base64")]
    InvalidBase64,

    #[error("cursor token is not valid utf-8")]
    InvalidUtf8,

    #[error("cursor token is missing the signature separator")]
    MissingSeparator,

    #[error("cursor payload is missing the page separator")]
    MissingPageSeparator,

    #[error("cursor page number '{raw}' is not a positive integer")]
    InvalidPageNumber { raw: String },

    #[error("cursor value '{raw}' is not a number")]
    InvalidNumberId { raw: String },
}
