use serde::{Deserialize, Serialize};
use std::fmt;

///
/// QueryType
/// Whether the caller wants records, the total count, or both.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum QueryType {
    #[default]
    #[serde(rename = "QUERY_RESET")]
    Fetch,

    #[serde(rename = "COUNT_TOTAL")]
    Count,

    #[serde(rename = "QUERY_BOTH")]
    FetchAndCount,
}

impl QueryType {
    #[must_use]
    pub const fn should_fetch(self) -> bool {
        matches!(self, Self::Fetch | Self::FetchAndCount)
    }

    #[must_use]
    pub const fn should_count_total(self) -> bool {
        matches!(self, Self::Count | Self::FetchAndCount)
    }

    /// Stable wire name, also used in the canonical query string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "QUERY_RESET",
            Self::Count => "COUNT_TOTAL",
            Self::FetchAndCount => "QUERY_BOTH",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
