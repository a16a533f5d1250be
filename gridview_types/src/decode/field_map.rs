//! An in-memory field reader over already decoded values.

use indexmap::IndexMap;

use super::{CompactReader, FieldReader, PortableReader, Primitive};
use crate::{CompactObject, DecodeError, PortableObject, Value};

/// An in-memory structured reader: field name to already-native value.
///
/// Serves fixtures and callers that hold object fields as [`Value`]s rather
/// than a serialized buffer. A null field is stored as [`Value::Nil`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: IndexMap<String, Value>,
}

impl FieldMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FieldMap::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn field(&self, name: &str) -> Result<&Value, DecodeError> {
        self.fields
            .get(name)
            .ok_or_else(|| DecodeError::field_read(name, "no such field"))
    }

    fn nullable<T, F>(&self, name: &str, convert: F) -> Result<Option<T>, DecodeError>
    where
        F: FnOnce(Value) -> Option<T>,
    {
        match self.field(name)? {
            Value::Nil => Ok(None),
            v => convert(v.clone())
                .map(Some)
                .ok_or_else(|| mismatch(name, v)),
        }
    }

    fn elements<T, F>(&self, name: &str, convert: F) -> Result<Option<Vec<T>>, DecodeError>
    where
        F: Fn(Value) -> Option<T>,
    {
        match self.field(name)? {
            Value::Nil => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| convert(item.clone()).ok_or_else(|| mismatch(name, item)))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            other => Err(mismatch(name, other)),
        }
    }
}

fn mismatch(name: &str, found: &Value) -> DecodeError {
    DecodeError::field_read(name, format!("unexpected value {found:?}"))
}

fn nullable_element<T>(value: Value, convert: impl Fn(Value) -> Option<T>) -> Option<Option<T>> {
    match value {
        Value::Nil => Some(None),
        v => convert(v).map(Some),
    }
}

fn compact_of(value: Value) -> Option<CompactObject> {
    match value {
        Value::Compact(obj) => Some(obj),
        _ => None,
    }
}

fn portable_of(value: Value) -> Option<PortableObject> {
    match value {
        Value::Portable(obj) => Some(obj),
        _ => None,
    }
}

impl FieldReader for FieldMap {
    fn read<T: Primitive>(&mut self, field: &str) -> Result<T, DecodeError> {
        let v = self.field(field)?;
        T::from_value(v.clone()).ok_or_else(|| mismatch(field, v))
    }

    fn read_nullable<T: Primitive>(&mut self, field: &str) -> Result<Option<T>, DecodeError> {
        self.nullable(field, T::from_value)
    }

    fn read_array<T: Primitive>(&mut self, field: &str) -> Result<Option<Vec<T>>, DecodeError> {
        self.elements(field, T::from_value)
    }

    fn read_array_of_nullable<T: Primitive>(
        &mut self,
        field: &str,
    ) -> Result<Option<Vec<Option<T>>>, DecodeError> {
        self.elements(field, |v| nullable_element(v, T::from_value))
    }
}

impl CompactReader for FieldMap {
    fn read_compact(&mut self, field: &str) -> Result<Option<CompactObject>, DecodeError> {
        self.nullable(field, compact_of)
    }

    fn read_array_of_compact(
        &mut self,
        field: &str,
    ) -> Result<Option<Vec<Option<CompactObject>>>, DecodeError> {
        self.elements(field, |v| nullable_element(v, compact_of))
    }
}

impl PortableReader for FieldMap {
    fn read_portable(&mut self, field: &str) -> Result<Option<PortableObject>, DecodeError> {
        self.nullable(field, portable_of)
    }

    fn read_portable_array(
        &mut self,
        field: &str,
    ) -> Result<Option<Vec<PortableObject>>, DecodeError> {
        self.elements(field, portable_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_mismatches() {
        let mut map = FieldMap::new()
            .with("n", 5_i32)
            .with("s", Value::Nil)
            .with("xs", Value::Array(vec![Value::Int64(1), Value::Nil]));
        assert_eq!(map.read::<i32>("n"), Ok(5));
        assert!(map.read::<i64>("n").is_err());
        assert_eq!(map.read_nullable::<String>("s"), Ok(None));
        assert!(map.read::<String>("s").is_err());
        assert_eq!(
            map.read_array_of_nullable::<i64>("xs"),
            Ok(Some(vec![Some(1), None]))
        );
        assert!(map.read_array::<i64>("xs").is_err());
        assert!(matches!(
            map.read::<i32>("missing"),
            Err(DecodeError::FieldRead { .. })
        ));
    }

    #[test]
    fn test_insert_replaces() {
        let mut map = FieldMap::new().with("a", 1_i32);
        map.insert("a", "one");
        assert_eq!(map.get("a"), Some(&Value::String("one".into())));
    }
}
