//! Columns, rows and nested column lists.

use std::ops::Deref;

use itertools::Itertools;
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::sentinel::NOT_DECODED;
use crate::{DecodeError, TypeTag, Value};

/// Name of the entry key column.
pub const NAME_KEY: &str = "__key";
/// Name of the key type column.
pub const NAME_KEY_TYPE: &str = "__key_type";
/// Name of the primary value column.
pub const NAME_VALUE: &str = "this";
/// Name of the value type column.
pub const NAME_VALUE_TYPE: &str = "this_type";

/// Identity columns, in the order they lead a table.
pub const IDENTITY_NAMES: [&str; 4] = [NAME_KEY, NAME_KEY_TYPE, NAME_VALUE, NAME_VALUE_TYPE];

/// A named, tagged value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Field name; empty for an unnamed value.
    pub name: String,
    /// Kind of `value`.
    pub tag: TypeTag,
    /// The value itself.
    pub value: Value,
}

/// An ordered sequence of columns.
pub type Row = Vec<Column>;

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, tag: TypeTag, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            tag,
            value: value.into(),
        }
    }

    /// Create a column from a numeric type id.
    ///
    /// Ids this build does not know produce an [`TypeTag::Unknown`] column.
    pub fn from_type_id(name: impl Into<String>, type_id: i32, value: impl Into<Value>) -> Self {
        let tag = TypeTag::from_id(type_id).unwrap_or_else(|err| {
            warn!("{err}, rendering as unknown");
            TypeTag::Unknown
        });
        Self::new(name, tag, value)
    }

    /// A nil column.
    pub fn nil(name: impl Into<String>) -> Self {
        Self::new(name, TypeTag::Nil, Value::Nil)
    }

    /// A placeholder for a value elided from rendering.
    pub fn skip(name: impl Into<String>) -> Self {
        Self::new(name, TypeTag::Skip, Value::Nil)
    }

    /// A column whose decoding failed.
    pub fn not_decoded(name: impl Into<String>) -> Self {
        Self::new(name, TypeTag::NotDecoded, Value::Nil)
    }

    /// The entry key column.
    pub fn key(tag: TypeTag, value: impl Into<Value>) -> Self {
        Self::new(NAME_KEY, tag, value)
    }

    /// The key type column, holding the label of `tag`.
    #[must_use]
    pub fn key_type(tag: TypeTag) -> Self {
        Self::new(NAME_KEY_TYPE, TypeTag::String, tag.label())
    }

    /// The primary value column.
    pub fn primary(tag: TypeTag, value: impl Into<Value>) -> Self {
        Self::new(NAME_VALUE, tag, value)
    }

    /// The value type column, holding the label of `tag`.
    #[must_use]
    pub fn primary_type(tag: TypeTag) -> Self {
        Self::new(NAME_VALUE_TYPE, TypeTag::String, tag.label())
    }

    /// Text form; may span lines.
    #[must_use]
    pub fn text(&self) -> String {
        self.tag.stringify(&self.value)
    }

    /// Text form with line breaks collapsed to spaces.
    #[must_use]
    pub fn single_line(&self) -> String {
        let text = self.text();
        if text.contains(['\n', '\r']) {
            text.replace("\r\n", " ").replace(['\n', '\r'], " ")
        } else {
            text
        }
    }

    /// JSON form.
    ///
    /// # Errors
    ///
    /// Fails for composite columns with a malformed embedded encoding.
    pub fn to_json(&self) -> Result<JsonValue, DecodeError> {
        self.tag.to_json(&self.value)
    }

    /// Sub-columns; see [`TypeTag::flatten`].
    ///
    /// # Errors
    ///
    /// Same as [`TypeTag::flatten`].
    pub fn flatten(&self) -> Result<Vec<Column>, DecodeError> {
        self.tag.flatten(&self.value)
    }

    /// Whether the header unifier breaks this column out into sub-columns.
    #[must_use]
    pub const fn is_flattenable(&self) -> bool {
        self.tag.is_composite() && !self.value.is_nil()
    }
}

/// A row used as the value of a composite column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnList(Vec<Column>);

impl ColumnList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a column.
    pub fn push(&mut self, column: Column) {
        self.0.push(column);
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the columns.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    /// Borrow the columns.
    #[must_use]
    pub fn as_slice(&self) -> &[Column] {
        &self.0
    }

    /// Take the columns.
    #[must_use]
    pub fn into_vec(self) -> Vec<Column> {
        self.0
    }

    /// Sort by column name, keeping the relative order of equal names.
    #[must_use]
    pub fn sorted_by_name(mut self) -> Self {
        self.0.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    /// `name:value; name:value`.
    #[must_use]
    pub fn text(&self) -> String {
        self.0
            .iter()
            .map(|c| format!("{}:{}", c.name, c.text()))
            .join("; ")
    }

    /// A JSON object keyed by column name. Columns that fail to project become `"*"`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .0
            .iter()
            .map(|c| {
                let v = c
                    .to_json()
                    .unwrap_or_else(|_| JsonValue::String(NOT_DECODED.to_owned()));
                (c.name.clone(), v)
            })
            .collect();
        JsonValue::Object(map)
    }
}

impl Deref for ColumnList {
    type Target = [Column];

    fn deref(&self) -> &[Column] {
        &self.0
    }
}

impl From<Vec<Column>> for ColumnList {
    fn from(columns: Vec<Column>) -> Self {
        Self(columns)
    }
}

impl FromIterator<Column> for ColumnList {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ColumnList {
    type Item = Column;
    type IntoIter = std::vec::IntoIter<Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ColumnList {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<ColumnList> for Value {
    /// A bare column list is carried as an anonymous compact object.
    fn from(fields: ColumnList) -> Self {
        Self::Compact(crate::CompactObject::new("", fields))
    }
}
