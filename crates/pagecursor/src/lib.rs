//! ## Crate layout
//! - `core`: query validation, cursor codec, page assembly and metrics.
//!
//! The `prelude` module carries what a request handler needs to accept a
//! cursor query and answer it with a signed page.

pub use pagecursor_core as core;

pub use pagecursor_core::{
    Error,
    config::{ConfigError, CursorConfig},
    page::{CursorPagination, PaginateError},
    query::{CursorPolicy, CursorQuery, QueryError},
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse a TOML cursor config and turn it into a runtime policy.
pub fn policy_from_toml(source: &str) -> Result<CursorPolicy, ConfigError> {
    let config = CursorConfig::from_toml_str(source)?;

    CursorPolicy::from_config(&config)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::{CursorConfig, EndDetection},
        cursor::{KeysetSeek, SeekOp},
        page::{CursorPagination, CursorRecord, Paginator, RecordSource},
        query::{
            CanonicalFields, CursorPolicy, CursorQuery, DefaultOrderField, OrderDirection,
            QueryFilter, QueryType,
        },
    };
    pub use serde::{Deserialize, Serialize};
}
