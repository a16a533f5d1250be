//! Compact objects, decoded field by field in schema order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use super::{FieldReader, read_array, read_nullable, read_nullable_array, read_scalar};
use crate::{Column, CompactObject, DecodeError, Decimal, TypeTag, Value};

macro_rules! field_kinds {
    ($( $(#[$meta:meta])* $variant:ident = $id:literal => $name:literal, )*) => {
        /// Kind of a compact field.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum FieldKind {
            $( $(#[$meta])* $variant = $id, )*
        }

        impl FieldKind {
            /// The wire id.
            #[must_use]
            pub const fn id(self) -> i32 {
                self as i32
            }

            /// Lower-case name, e.g. `nullable_int32_array`.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(FieldKind::$variant => $name,)*
                }
            }

            /// Resolve a wire id.
            ///
            /// # Errors
            ///
            /// Fails for ids outside the known range.
            pub fn from_id(id: i32) -> Result<Self, DecodeError> {
                match id {
                    $($id => Ok(FieldKind::$variant),)*
                    other => Err(DecodeError::invalid_schema(format!("unknown compact field kind id {other}"))),
                }
            }
        }

        impl FromStr for FieldKind {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(FieldKind::$variant),)*
                    other => Err(DecodeError::invalid_schema(format!("unknown compact field kind '{other}'"))),
                }
            }
        }
    };
}

field_kinds! {
    /// No kind; never valid in a schema.
    NotAvailable = 0 => "not_available",
    /// Boolean.
    Boolean = 1 => "bool",
    /// Array of booleans.
    ArrayOfBoolean = 2 => "bool_array",
    /// 8 bit integer.
    Int8 = 3 => "int8",
    /// Array of 8 bit integers.
    ArrayOfInt8 = 4 => "int8_array",
    /// Char; the compact format cannot carry it.
    Char = 5 => "char",
    /// Array of chars; the compact format cannot carry it.
    ArrayOfChar = 6 => "char_array",
    /// 16 bit integer.
    Int16 = 7 => "int16",
    /// Array of 16 bit integers.
    ArrayOfInt16 = 8 => "int16_array",
    /// 32 bit integer.
    Int32 = 9 => "int32",
    /// Array of 32 bit integers.
    ArrayOfInt32 = 10 => "int32_array",
    /// 64 bit integer.
    Int64 = 11 => "int64",
    /// Array of 64 bit integers.
    ArrayOfInt64 = 12 => "int64_array",
    /// 32 bit float.
    Float32 = 13 => "float32",
    /// Array of 32 bit floats.
    ArrayOfFloat32 = 14 => "float32_array",
    /// 64 bit float.
    Float64 = 15 => "float64",
    /// Array of 64 bit floats.
    ArrayOfFloat64 = 16 => "float64_array",
    /// Nullable string.
    String = 17 => "string",
    /// Array of nullable strings.
    ArrayOfString = 18 => "string_array",
    /// Nullable decimal.
    Decimal = 19 => "decimal",
    /// Array of nullable decimals.
    ArrayOfDecimal = 20 => "decimal_array",
    /// Nullable local time.
    Time = 21 => "time",
    /// Array of nullable local times.
    ArrayOfTime = 22 => "time_array",
    /// Nullable local date.
    Date = 23 => "date",
    /// Array of nullable local dates.
    ArrayOfDate = 24 => "date_array",
    /// Nullable local date-time.
    Timestamp = 25 => "timestamp",
    /// Array of nullable local date-times.
    ArrayOfTimestamp = 26 => "timestamp_array",
    /// Nullable offset date-time.
    TimestampWithTimezone = 27 => "timestamp_with_timezone",
    /// Array of nullable offset date-times.
    ArrayOfTimestampWithTimezone = 28 => "timestamp_with_timezone_array",
    /// Nested compact object.
    Compact = 29 => "compact",
    /// Array of nested compact objects.
    ArrayOfCompact = 30 => "compact_array",
    /// Portable; the compact format cannot carry it.
    Portable = 31 => "portable",
    /// Array of portables; the compact format cannot carry it.
    ArrayOfPortable = 32 => "portable_array",
    /// Nullable boolean.
    NullableBoolean = 33 => "nullable_bool",
    /// Array of nullable booleans.
    ArrayOfNullableBoolean = 34 => "nullable_bool_array",
    /// Nullable 8 bit integer.
    NullableInt8 = 35 => "nullable_int8",
    /// Array of nullable 8 bit integers.
    ArrayOfNullableInt8 = 36 => "nullable_int8_array",
    /// Nullable 16 bit integer.
    NullableInt16 = 37 => "nullable_int16",
    /// Array of nullable 16 bit integers.
    ArrayOfNullableInt16 = 38 => "nullable_int16_array",
    /// Nullable 32 bit integer.
    NullableInt32 = 39 => "nullable_int32",
    /// Array of nullable 32 bit integers.
    ArrayOfNullableInt32 = 40 => "nullable_int32_array",
    /// Nullable 64 bit integer.
    NullableInt64 = 41 => "nullable_int64",
    /// Array of nullable 64 bit integers.
    ArrayOfNullableInt64 = 42 => "nullable_int64_array",
    /// Nullable 32 bit float.
    NullableFloat32 = 43 => "nullable_float32",
    /// Array of nullable 32 bit floats.
    ArrayOfNullableFloat32 = 44 => "nullable_float32_array",
    /// Nullable 64 bit float.
    NullableFloat64 = 45 => "nullable_float64",
    /// Array of nullable 64 bit floats.
    ArrayOfNullableFloat64 = 46 => "nullable_float64_array",
}

impl FieldKind {
    /// Whether a compact schema may contain this kind.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(
            self,
            Self::NotAvailable | Self::Char | Self::ArrayOfChar | Self::Portable | Self::ArrayOfPortable
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered field names and kinds of a compact type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    type_name: String,
    fields: Vec<(String, FieldKind)>,
}

impl Schema {
    /// Create a schema.
    ///
    /// # Errors
    ///
    /// Fails on duplicate field names and on kinds the compact format cannot
    /// carry (char, portable and their arrays).
    pub fn new<N: Into<String>>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (N, FieldKind)>,
    ) -> Result<Self, DecodeError> {
        let type_name = type_name.into();
        let fields: Vec<(String, FieldKind)> =
            fields.into_iter().map(|(n, k)| (n.into(), k)).collect();
        let mut seen = HashSet::with_capacity(fields.len());
        for (name, kind) in &fields {
            if !kind.is_supported() {
                return Err(DecodeError::invalid_schema(format!(
                    "{type_name}.{name}: compact fields cannot be of kind {kind}"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(DecodeError::invalid_schema(format!(
                    "{type_name}: duplicate field '{name}'"
                )));
            }
        }
        Ok(Self { type_name, fields })
    }

    /// Type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields in schema order.
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldKind)] {
        &self.fields
    }
}

/// Structured reader over one compact object.
pub trait CompactReader: FieldReader {
    /// Read a nested compact object, already decoded against its own schema.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_compact(&mut self, field: &str) -> Result<Option<CompactObject>, DecodeError>;

    /// Read an array of nested compact objects.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_array_of_compact(
        &mut self,
        field: &str,
    ) -> Result<Option<Vec<Option<CompactObject>>>, DecodeError>;
}

/// Decode a compact object, one column per schema field in schema order.
///
/// A field that fails to read becomes a not-decoded column; the rest of the
/// object is still decoded.
pub fn decode_compact<R: CompactReader>(schema: &Schema, reader: &mut R) -> CompactObject {
    let fields: Vec<Column> = schema
        .fields()
        .iter()
        .map(|(name, kind)| {
            read_field(reader, name, *kind).unwrap_or_else(|err| {
                debug!("{}.{name}: {err}", schema.type_name());
                Column::not_decoded(name.as_str())
            })
        })
        .collect();
    CompactObject::new(schema.type_name(), fields)
}

/// # Panics
///
/// On kinds rejected by [`Schema::new`].
fn read_field<R: CompactReader>(
    reader: &mut R,
    name: &str,
    kind: FieldKind,
) -> Result<Column, DecodeError> {
    use FieldKind as K;

    match kind {
        K::Boolean => read_scalar::<bool, _>(reader, name),
        K::Int8 => read_scalar::<i8, _>(reader, name),
        K::Int16 => read_scalar::<i16, _>(reader, name),
        K::Int32 => read_scalar::<i32, _>(reader, name),
        K::Int64 => read_scalar::<i64, _>(reader, name),
        K::Float32 => read_scalar::<f32, _>(reader, name),
        K::Float64 => read_scalar::<f64, _>(reader, name),

        K::ArrayOfBoolean => read_array::<bool, _>(reader, name, TypeTag::BoolArray),
        K::ArrayOfInt8 => read_array::<i8, _>(reader, name, TypeTag::Int8Array),
        K::ArrayOfInt16 => read_array::<i16, _>(reader, name, TypeTag::Int16Array),
        K::ArrayOfInt32 => read_array::<i32, _>(reader, name, TypeTag::Int32Array),
        K::ArrayOfInt64 => read_array::<i64, _>(reader, name, TypeTag::Int64Array),
        K::ArrayOfFloat32 => read_array::<f32, _>(reader, name, TypeTag::Float32Array),
        K::ArrayOfFloat64 => read_array::<f64, _>(reader, name, TypeTag::Float64Array),

        K::String => read_nullable::<String, _>(reader, name, TypeTag::String),
        K::Decimal => read_nullable::<Decimal, _>(reader, name, TypeTag::JavaDecimal),
        K::Time => read_nullable::<NaiveTime, _>(reader, name, TypeTag::LocalTime),
        K::Date => read_nullable::<NaiveDate, _>(reader, name, TypeTag::LocalDate),
        K::Timestamp => read_nullable::<NaiveDateTime, _>(reader, name, TypeTag::LocalDateTime),
        K::TimestampWithTimezone => {
            read_nullable::<DateTime<FixedOffset>, _>(reader, name, TypeTag::OffsetDateTime)
        }

        K::ArrayOfString => read_nullable_array::<String, _>(reader, name, TypeTag::StringArray),
        K::ArrayOfDecimal => read_nullable_array::<Decimal, _>(reader, name, TypeTag::DecimalArray),
        K::ArrayOfTime => read_nullable_array::<NaiveTime, _>(reader, name, TypeTag::LocalTimeArray),
        K::ArrayOfDate => read_nullable_array::<NaiveDate, _>(reader, name, TypeTag::LocalDateArray),
        K::ArrayOfTimestamp => {
            read_nullable_array::<NaiveDateTime, _>(reader, name, TypeTag::LocalDateTimeArray)
        }
        K::ArrayOfTimestampWithTimezone => read_nullable_array::<DateTime<FixedOffset>, _>(
            reader,
            name,
            TypeTag::OffsetDateTimeArray,
        ),

        K::NullableBoolean => read_nullable::<bool, _>(reader, name, TypeTag::NullableBool),
        K::NullableInt8 => read_nullable::<i8, _>(reader, name, TypeTag::NullableInt8),
        K::NullableInt16 => read_nullable::<i16, _>(reader, name, TypeTag::NullableInt16),
        K::NullableInt32 => read_nullable::<i32, _>(reader, name, TypeTag::NullableInt32),
        K::NullableInt64 => read_nullable::<i64, _>(reader, name, TypeTag::NullableInt64),
        K::NullableFloat32 => read_nullable::<f32, _>(reader, name, TypeTag::NullableFloat32),
        K::NullableFloat64 => read_nullable::<f64, _>(reader, name, TypeTag::NullableFloat64),

        K::ArrayOfNullableBoolean => {
            read_nullable_array::<bool, _>(reader, name, TypeTag::NullableBoolArray)
        }
        K::ArrayOfNullableInt8 => {
            read_nullable_array::<i8, _>(reader, name, TypeTag::NullableInt8Array)
        }
        K::ArrayOfNullableInt16 => {
            read_nullable_array::<i16, _>(reader, name, TypeTag::NullableInt16Array)
        }
        K::ArrayOfNullableInt32 => {
            read_nullable_array::<i32, _>(reader, name, TypeTag::NullableInt32Array)
        }
        K::ArrayOfNullableInt64 => {
            read_nullable_array::<i64, _>(reader, name, TypeTag::NullableInt64Array)
        }
        K::ArrayOfNullableFloat32 => {
            read_nullable_array::<f32, _>(reader, name, TypeTag::NullableFloat32Array)
        }
        K::ArrayOfNullableFloat64 => {
            read_nullable_array::<f64, _>(reader, name, TypeTag::NullableFloat64Array)
        }

        K::Compact => {
            let obj = reader.read_compact(name)?;
            Ok(Column::new(name, TypeTag::Compact, obj))
        }
        K::ArrayOfCompact => {
            let items = reader.read_array_of_compact(name)?;
            let value = items.map_or(Value::Nil, |objs| {
                Value::Array(objs.into_iter().map(Value::from).collect())
            });
            Ok(Column::new(name, TypeTag::CompactArray, value))
        }

        K::NotAvailable | K::Char | K::ArrayOfChar | K::Portable | K::ArrayOfPortable => {
            unreachable!("compact schemas never contain {kind} fields")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::FieldMap;
    use crate::sentinel::NOT_DECODED;
    use rstest::rstest;

    fn schema(fields: &[(&str, FieldKind)]) -> Schema {
        Schema::new("test", fields.iter().copied()).unwrap()
    }

    #[test]
    fn test_keeps_schema_order() {
        let s = schema(&[
            ("zeta", FieldKind::Int32),
            ("alpha", FieldKind::String),
            ("mid", FieldKind::Boolean),
        ]);
        let mut reader = FieldMap::new()
            .with("alpha", "a")
            .with("mid", true)
            .with("zeta", 26);
        let obj = decode_compact(&s, &mut reader);
        let names: Vec<_> = obj.fields().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(obj.fields().text(), "zeta:26; alpha:a; mid:true");
    }

    #[test]
    fn test_nullable_and_arrays() {
        let s = schema(&[
            ("n", FieldKind::NullableInt8),
            ("arr", FieldKind::ArrayOfNullableInt8),
            ("strs", FieldKind::ArrayOfString),
            ("empty", FieldKind::ArrayOfInt32),
        ]);
        let mut reader = FieldMap::new()
            .with("n", Value::Nil)
            .with("arr", Value::Array(vec![Value::Nil, Value::Int8(8)]))
            .with("strs", Value::Array(vec!["x".into(), Value::Nil]))
            .with("empty", Value::Array(vec![]));
        let obj = decode_compact(&s, &mut reader);
        let texts: Vec<_> = obj.fields().iter().map(Column::text).collect();
        assert_eq!(texts, vec!["-", "[-, 8]", "[x, -]", "[]"]);
        assert_eq!(obj.fields()[0].tag, TypeTag::NullableInt8);
    }

    #[test]
    fn test_nested_compact() {
        let inner = CompactObject::new("inner", vec![Column::new("value", TypeTag::String, "obj1")]);
        let s = schema(&[("child", FieldKind::Compact), ("children", FieldKind::ArrayOfCompact)]);
        let mut reader = FieldMap::new()
            .with("child", inner.clone())
            .with("children", Value::Array(vec![Value::Compact(inner), Value::Nil]));
        let obj = decode_compact(&s, &mut reader);
        assert_eq!(obj.fields()[0].text(), "value:obj1");
        assert_eq!(obj.fields()[1].text(), "[value:obj1, -]");
    }

    #[test]
    fn test_bad_field_degrades_alone() {
        let s = schema(&[("a", FieldKind::Int32), ("b", FieldKind::Int32)]);
        let mut reader = FieldMap::new().with("a", "not a number").with("b", 2);
        let obj = decode_compact(&s, &mut reader);
        assert_eq!(obj.fields()[0].text(), NOT_DECODED);
        assert_eq!(obj.fields()[1].text(), "2");
    }

    #[rstest]
    #[case(FieldKind::Char)]
    #[case(FieldKind::ArrayOfChar)]
    #[case(FieldKind::Portable)]
    #[case(FieldKind::ArrayOfPortable)]
    #[case(FieldKind::NotAvailable)]
    fn test_schema_rejects_unsupported_kinds(#[case] kind: FieldKind) {
        assert!(matches!(
            Schema::new("t", [("f", kind)]),
            Err(DecodeError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        assert!(Schema::new("t", [("f", FieldKind::Int8), ("f", FieldKind::Int16)]).is_err());
    }

    #[rstest]
    #[case("bool", FieldKind::Boolean)]
    #[case("int8_array", FieldKind::ArrayOfInt8)]
    #[case("nullable_int32_array", FieldKind::ArrayOfNullableInt32)]
    #[case("timestamp_with_timezone", FieldKind::TimestampWithTimezone)]
    fn test_kind_names(#[case] name: &str, #[case] kind: FieldKind) {
        assert_eq!(name.parse::<FieldKind>(), Ok(kind));
        assert_eq!(kind.to_string(), name);
        assert_eq!(FieldKind::from_id(kind.id()), Ok(kind));
    }
}
