//! Canonical rendering of query fields for cursor signatures.
//!
//! A query contributes `name=value` entries; entries are sorted by name and
//! joined with `&`. Absent values contribute nothing. Collections render
//! element-wise, comma-joined, so the string never depends on a container's
//! own debug representation. Text percent-escapes the separators, so a value
//! can never pose as another entry or element.

use crate::query::{DefaultOrderField, OrderDirection, QueryType};
use std::collections::{BTreeMap, BTreeSet};

const ENTRY_SEPARATOR: &str = "&";
const VALUE_SEPARATOR: &str = ",";

///
/// CanonicalText
///
/// Deterministic text form of one query field value.
///

pub trait CanonicalText {
    /// Render this value, or `None` when the field is absent.
    fn canonical_text(&self) -> Option<String>;
}

macro_rules! canonical_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CanonicalText for $ty {
                fn canonical_text(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

canonical_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool
);

impl CanonicalText for str {
    fn canonical_text(&self) -> Option<String> {
        Some(escape(self))
    }
}

impl CanonicalText for String {
    fn canonical_text(&self) -> Option<String> {
        self.as_str().canonical_text()
    }
}

impl CanonicalText for char {
    fn canonical_text(&self) -> Option<String> {
        self.encode_utf8(&mut [0; 4]).canonical_text()
    }
}

// '%' goes first so existing escapes stay unambiguous.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            ',' => out.push_str("%2C"),
            '=' => out.push_str("%3D"),
            _ => out.push(ch),
        }
    }

    out
}

// Floats keep a fractional part so `1.0` never collapses to `1`.
macro_rules! canonical_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CanonicalText for $ty {
                fn canonical_text(&self) -> Option<String> {
                    Some(format!("{self:?}"))
                }
            }
        )*
    };
}

canonical_float!(f32, f64);

impl CanonicalText for OrderDirection {
    fn canonical_text(&self) -> Option<String> {
        Some(self.as_str().to_string())
    }
}

impl CanonicalText for QueryType {
    fn canonical_text(&self) -> Option<String> {
        Some(self.as_str().to_string())
    }
}

impl CanonicalText for DefaultOrderField {
    fn canonical_text(&self) -> Option<String> {
        Some(self.as_str().to_string())
    }
}

impl<T: CanonicalText + ?Sized> CanonicalText for &T {
    fn canonical_text(&self) -> Option<String> {
        (**self).canonical_text()
    }
}

impl<T: CanonicalText> CanonicalText for Option<T> {
    fn canonical_text(&self) -> Option<String> {
        self.as_ref().and_then(CanonicalText::canonical_text)
    }
}

impl<T: CanonicalText> CanonicalText for [T] {
    fn canonical_text(&self) -> Option<String> {
        Some(join_elements(self.iter()))
    }
}

impl<T: CanonicalText, const N: usize> CanonicalText for [T; N] {
    fn canonical_text(&self) -> Option<String> {
        self.as_slice().canonical_text()
    }
}

impl<T: CanonicalText> CanonicalText for Vec<T> {
    fn canonical_text(&self) -> Option<String> {
        self.as_slice().canonical_text()
    }
}

impl<T: CanonicalText> CanonicalText for BTreeSet<T> {
    fn canonical_text(&self) -> Option<String> {
        Some(join_elements(self.iter()))
    }
}

// Absent elements inside a collection keep their position as an empty slot.
fn join_elements<'a, T, I>(elements: I) -> String
where
    T: CanonicalText + 'a,
    I: Iterator<Item = &'a T>,
{
    elements
        .map(|element| element.canonical_text().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR)
}

///
/// CanonicalFields
///
/// Collector for the `name=value` entries that bind a cursor to its query.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CanonicalFields {
    entries: Vec<(String, String)>,
}

impl CanonicalFields {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add one field; absent values are skipped.
    pub fn push<T>(&mut self, name: impl Into<String>, value: &T) -> &mut Self
    where
        T: CanonicalText + ?Sized,
    {
        if let Some(text) = value.canonical_text() {
            let name: String = name.into();
            self.entries.push((escape(&name), text));
        }

        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render sorted by field name.
    #[must_use]
    pub fn render(mut self) -> String {
        // stable: duplicate names keep insertion order
        self.entries.sort_by(|left, right| left.0.cmp(&right.0));

        self.entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }
}

///
/// QueryFilter
///
/// Caller-defined filter fields carried by a cursor query. Every field that
/// narrows the result set must be contributed, otherwise a cursor could be
/// replayed against a different filter.
///

pub trait QueryFilter {
    fn canonical_fields(&self, fields: &mut CanonicalFields);
}

impl QueryFilter for () {
    fn canonical_fields(&self, _fields: &mut CanonicalFields) {}
}

impl<V: CanonicalText> QueryFilter for BTreeMap<String, V> {
    fn canonical_fields(&self, fields: &mut CanonicalFields) {
        for (name, value) in self {
            fields.push(name.as_str(), value);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{CanonicalFields, CanonicalText};
    use crate::query::DefaultOrderField;
    use std::collections::BTreeSet;

    #[test]
    fn collections_render_element_wise() {
        assert_eq!(
            vec!["1", "2", "3"].canonical_text().as_deref(),
            Some("1,2,3")
        );
        assert_eq!([1_i32, 2, 3].canonical_text().as_deref(), Some("1,2,3"));
        assert_eq!(
            [1.0_f64, 2.0, 3.0].canonical_text().as_deref(),
            Some("1.0,2.0,3.0")
        );
        assert_eq!(
            [DefaultOrderField::Id, DefaultOrderField::GmtCreate]
                .canonical_text()
                .as_deref(),
            Some("id,gmt_create")
        );
        assert_eq!(
            BTreeSet::from([3_u64, 1, 2]).canonical_text().as_deref(),
            Some("1,2,3")
        );
    }

    #[test]
    fn absent_values_are_skipped() {
        let mut fields = CanonicalFields::new();
        fields
            .push("name", "zhang")
            .push("tag", &None::<String>)
            .push("age", &Some(7_u8));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.render(), "age=7&name=zhang");
    }

    #[test]
    fn render_sorts_entries_by_name() {
        let mut fields = CanonicalFields::new();
        fields.push("query_size", &20_u32).push("a_filter", "x");

        assert_eq!(fields.render(), "a_filter=x&query_size=20");
    }

    #[test]
    fn separators_inside_text_cannot_forge_entries() {
        let mut smuggled = CanonicalFields::new();
        smuggled.push("a", "x&b=y");
        let mut split = CanonicalFields::new();
        split.push("a", "x").push("b", "y");

        let smuggled = smuggled.render();
        assert_eq!(smuggled, "a=x%26b%3Dy");
        assert_ne!(smuggled, split.render());
        assert_eq!(
            vec!["a,b", "c"].canonical_text().as_deref(),
            Some("a%2Cb,c")
        );
        assert_eq!("100%".canonical_text().as_deref(), Some("100%25"));
        assert_eq!(','.canonical_text().as_deref(), Some("%2C"));
    }

    #[test]
    fn empty_collection_renders_as_empty_value() {
        let mut fields = CanonicalFields::new();
        fields.push("tags", &Vec::<String>::new());

        assert_eq!(fields.render(), "tags=");
    }
}
