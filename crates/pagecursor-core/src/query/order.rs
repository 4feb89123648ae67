use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// Column name of the canonical cursor field.
pub const DEFAULT_CURSOR_FIELD: &str = "id";

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn is_asc(self) -> bool {
        matches!(self, Self::Asc)
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// OrderSpec
///
/// Ordered `(field, direction)` pairs in declared ORDER BY position.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderSpec {
    pub fields: Vec<(String, OrderDirection)>,
}

impl OrderSpec {
    #[must_use]
    pub const fn new(fields: Vec<(String, OrderDirection)>) -> Self {
        Self { fields }
    }

    /// Single-field ordering.
    #[must_use]
    pub fn single(field: impl AsRef<str>, direction: OrderDirection) -> Self {
        Self::new(vec![(field.as_ref().to_string(), direction)])
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Direction declared for `field`, if it is ordered.
    #[must_use]
    pub fn direction_of(&self, field: &str) -> Option<OrderDirection> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, direction)| *direction)
    }

    /// Same fields with every direction inverted.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(
            self.fields
                .iter()
                .map(|(field, direction)| (field.clone(), direction.reversed()))
                .collect(),
        )
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }

    pub fn directions(&self) -> impl Iterator<Item = OrderDirection> + '_ {
        self.fields.iter().map(|(_, direction)| *direction)
    }
}

///
/// DefaultOrderField
/// Built-in sortable columns.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultOrderField {
    Id,
    GmtCreate,
}

impl DefaultOrderField {
    pub const ALL: [Self; 2] = [Self::Id, Self::GmtCreate];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::GmtCreate => "gmt_create",
        }
    }

    /// Resolve a column name, ignoring surrounding whitespace and case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
    }
}

impl AsRef<str> for DefaultOrderField {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DefaultOrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// OrderFieldRegistry
///
/// Allow-list of columns a cursor query may order by.
/// Keeps ordering on indexed, stable columns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderFieldRegistry {
    fields: BTreeSet<String>,
}

impl OrderFieldRegistry {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl Default for OrderFieldRegistry {
    fn default() -> Self {
        Self::new(DefaultOrderField::ALL.map(DefaultOrderField::as_str))
    }
}

///
/// TESTS
///
