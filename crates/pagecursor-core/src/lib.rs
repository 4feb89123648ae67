//! Core engine for signed keyset pagination: query validation, cursor
//! tokens, page assembly, and observability.
//!
//! A cursor is only valid for the exact query shape that minted it. Any
//! change to page size, ordering, or filter fields invalidates it.
#![warn(unreachable_pub)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod obs;
pub mod page;
pub mod query;

pub use error::Error;

///
/// Prelude
///
/// Types a request handler needs to build a query and page through a store.
///

pub mod prelude {
    pub use crate::{
        config::{CursorConfig, EndDetection},
        cursor::KeysetSeek,
        page::{CursorPagination, CursorRecord, Paginator, RecordSource},
        query::{
            CursorPolicy, CursorQuery, DefaultOrderField, OrderDirection, QueryFilter, QueryType,
        },
    };
}
