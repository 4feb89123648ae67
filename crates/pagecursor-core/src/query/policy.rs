//! Query-shape policy for cursor pagination.
//!
//! This module is the sole owner of the size ceiling and the order-field
//! allow-list. Constructors and the assembler consult one shared policy
//! instead of process-global state.

use crate::{
    config::{ConfigError, CursorConfig, EndDetection},
    query::{OrderFieldRegistry, OrderSpec, QueryError},
};
use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicU32, Ordering},
};

///
/// CursorPolicy
///
/// Runtime form of [`CursorConfig`]. The size ceiling is an atomic so it can
/// be replaced while requests are in flight; everything else is fixed at
/// construction.
///

#[derive(Debug)]
pub struct CursorPolicy {
    registry: OrderFieldRegistry,
    cursor_field: String,
    default_query_size: u32,
    end_detection: EndDetection,
    max_query_size: AtomicU32,
}

impl CursorPolicy {
    pub fn from_config(config: &CursorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            registry: OrderFieldRegistry::new(config.order_fields.iter().cloned()),
            cursor_field: config.cursor_field.clone(),
            default_query_size: config.default_query_size,
            end_detection: config.end_detection,
            max_query_size: AtomicU32::new(config.max_query_size),
        })
    }

    #[must_use]
    pub fn with_end_detection(mut self, end_detection: EndDetection) -> Self {
        self.end_detection = end_detection;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &OrderFieldRegistry {
        &self.registry
    }

    #[must_use]
    pub fn cursor_field(&self) -> &str {
        &self.cursor_field
    }

    #[must_use]
    pub const fn default_query_size(&self) -> u32 {
        self.default_query_size
    }

    #[must_use]
    pub const fn end_detection(&self) -> EndDetection {
        self.end_detection
    }

    #[must_use]
    pub fn max_query_size(&self) -> u32 {
        self.max_query_size.load(Ordering::Relaxed)
    }

    /// Replace the size ceiling. Queries already validated are unaffected.
    pub fn set_max_query_size(&self, max: u32) -> Result<(), QueryError> {
        if max == 0 {
            return Err(QueryError::MaxQuerySizeZero);
        }
        self.max_query_size.store(max, Ordering::Relaxed);

        Ok(())
    }

    pub fn validate_query_size(&self, size: u32) -> Result<(), QueryError> {
        if size == 0 {
            return Err(QueryError::QuerySizeZero);
        }
        let max = self.max_query_size();
        if size > max {
            return Err(QueryError::QuerySizeExceedsMax { size, max });
        }

        Ok(())
    }

    /// Every field must be allow-listed and appear once, and the cursor field
    /// must be ordered.
    pub fn validate_order(&self, order: &OrderSpec) -> Result<(), QueryError> {
        if order.is_empty() {
            return Err(QueryError::EmptyOrderFields);
        }
        if let Some(field) = order
            .field_names()
            .find(|field| !self.registry.contains(field))
        {
            return Err(QueryError::OrderFieldNotAllowed {
                field: field.to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(field) = order.field_names().find(|field| !seen.insert(*field)) {
            return Err(QueryError::DuplicateOrderField {
                field: field.to_string(),
            });
        }
        if order.direction_of(&self.cursor_field).is_none() {
            return Err(QueryError::MissingCursorField {
                field: self.cursor_field.clone(),
            });
        }

        Ok(())
    }
}

impl Default for CursorPolicy {
    fn default() -> Self {
        let config = CursorConfig::default();

        Self {
            registry: OrderFieldRegistry::new(config.order_fields),
            cursor_field: config.cursor_field,
            default_query_size: config.default_query_size,
            end_detection: config.end_detection,
            max_query_size: AtomicU32::new(config.max_query_size),
        }
    }
}
