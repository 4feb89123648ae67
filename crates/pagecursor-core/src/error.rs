use crate::{cursor::CursorDecodeError, query::QueryError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level failure surface for query validation, cursor decoding and
/// page assembly. Client-caused failures keep their own variants so the
/// calling layer can map them to a 4xx-style response.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid cursor query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("malformed cursor: {0}")]
    MalformedCursor(#[from] CursorDecodeError),

    /// The token was forged, tampered with, or replayed against a different
    /// query shape. Carries nothing derived from the expected signature.
    #[error("cursor signature mismatch")]
    CursorSignature,

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Stable classification of this failure.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidQuery(_) => ErrorClass::InvalidQuery,
            Self::MalformedCursor(_) => ErrorClass::MalformedCursor,
            Self::CursorSignature => ErrorClass::CursorSignature,
            Self::Internal(err) => err.class,
        }
    }

    /// True when the failure was caused by caller-supplied input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.class().is_client()
    }
}

///
/// InternalError
///
/// Structured engine-side failure with a stable classification.
/// Signals a bug in the caller's fetch collaborator or in the engine itself,
/// never bad user input.
///

#[derive(Debug, ThisError)]
#[error("{origin}:{class}: {message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a codec-origin encoding failure.
    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Encoding, ErrorOrigin::Codec, message)
    }

    /// Construct a query-origin invariant violation.
    pub(crate) fn query_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Query, message)
    }

    /// Construct an assembler-origin invariant violation.
    pub(crate) fn assembler_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Assembler,
            message,
        )
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidQuery,
    MalformedCursor,
    CursorSignature,
    Encoding,
    InvariantViolation,
}

impl ErrorClass {
    #[must_use]
    pub const fn is_client(self) -> bool {
        matches!(
            self,
            Self::InvalidQuery | Self::MalformedCursor | Self::CursorSignature
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidQuery => "invalid_query",
            Self::MalformedCursor => "malformed_cursor",
            Self::CursorSignature => "cursor_signature",
            Self::Encoding => "encoding",
            Self::InvariantViolation => "invariant_violation",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Query,
    Codec,
    Assembler,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Query => "query",
            Self::Codec => "codec",
            Self::Assembler => "assembler",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
