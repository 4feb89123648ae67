//! Engine configuration.
//!
//! Loaded once at startup (usually from TOML) and turned into a
//! [`CursorPolicy`](crate::query::CursorPolicy) that validating calls borrow.

use crate::query::{DEFAULT_CURSOR_FIELD, DefaultOrderField};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Upper bound on page size unless configured otherwise.
pub const DEFAULT_MAX_QUERY_SIZE: u32 = 8192;

/// Page size used by the convenience constructors.
pub const DEFAULT_QUERY_SIZE: u32 = 20;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse cursor config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_query_size must be greater than 0")]
    MaxQuerySizeZero,

    #[error("default_query_size must be between 1 and {max}, found {found}")]
    DefaultQuerySizeOutOfRange { found: u32, max: u32 },

    #[error("order_fields must not be empty")]
    EmptyOrderFields,

    #[error("cursor_field '{field}' must be listed in order_fields")]
    CursorFieldNotAllowed { field: String },
}

///
/// EndDetection
///
/// How the assembler decides that a fetched batch is the last one.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndDetection {
    /// Fetch one record past the page and trim it; exact.
    #[default]
    LookAhead,

    /// Treat a batch shorter than the page size as the end. Cannot tell an
    /// exactly-full final page from a page with more data behind it.
    SizeCompare,
}

impl EndDetection {
    /// Number of records to request for a page of `query_size`.
    #[must_use]
    pub const fn fetch_limit(self, query_size: u32) -> u32 {
        match self {
            Self::LookAhead => query_size.saturating_add(1),
            Self::SizeCompare => query_size,
        }
    }
}

///
/// CursorConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CursorConfig {
    pub max_query_size: u32,
    pub default_query_size: u32,
    pub cursor_field: String,
    pub order_fields: Vec<String>,
    pub end_detection: EndDetection,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            max_query_size: DEFAULT_MAX_QUERY_SIZE,
            default_query_size: DEFAULT_QUERY_SIZE,
            cursor_field: DEFAULT_CURSOR_FIELD.to_string(),
            order_fields: DefaultOrderField::ALL
                .iter()
                .map(|field| field.as_str().to_string())
                .collect(),
            end_detection: EndDetection::default(),
        }
    }
}

impl CursorConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_query_size == 0 {
            return Err(ConfigError::MaxQuerySizeZero);
        }
        if self.default_query_size == 0 || self.default_query_size > self.max_query_size {
            return Err(ConfigError::DefaultQuerySizeOutOfRange {
                found: self.default_query_size,
                max: self.max_query_size,
            });
        }
        if self.order_fields.is_empty() {
            return Err(ConfigError::EmptyOrderFields);
        }
        if !self.order_fields.contains(&self.cursor_field) {
            return Err(ConfigError::CursorFieldNotAllowed {
                field: self.cursor_field.clone(),
            });
        }

        Ok(())
    }
}

///
/// TESTS
///
