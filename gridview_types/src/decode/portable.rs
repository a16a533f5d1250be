//! Portable objects, decoded against their class definition and sorted by field name.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use super::{FieldReader, read_array, read_nullable, read_nullable_array, read_scalar};
use crate::{Column, ColumnList, DecodeError, Decimal, PortableObject, TypeTag, Value};

macro_rules! portable_field_types {
    ($($variant:ident = $id:literal => $name:literal,)*) => {
        /// Type of a portable field.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        #[allow(missing_docs)]
        pub enum PortableFieldType {
            $($variant = $id,)*
        }

        impl PortableFieldType {
            /// The wire id.
            #[must_use]
            pub const fn id(self) -> i32 {
                self as i32
            }

            /// Lower-case name, e.g. `int32array`.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(PortableFieldType::$variant => $name,)*
                }
            }

            /// Resolve a wire id.
            ///
            /// # Errors
            ///
            /// Fails for ids outside the known range.
            pub fn from_id(id: i32) -> Result<Self, DecodeError> {
                match id {
                    $($id => Ok(PortableFieldType::$variant),)*
                    other => Err(DecodeError::invalid_schema(format!("unknown portable field type id {other}"))),
                }
            }
        }

        impl FromStr for PortableFieldType {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(PortableFieldType::$variant),)*
                    other => Err(DecodeError::invalid_schema(format!("unknown portable field type '{other}'"))),
                }
            }
        }
    };
}

portable_field_types! {
    Portable = 0 => "portable",
    Byte = 1 => "byte",
    Bool = 2 => "bool",
    Char = 3 => "uint16",
    Int16 = 4 => "int16",
    Int32 = 5 => "int32",
    Int64 = 6 => "int64",
    Float32 = 7 => "float32",
    Float64 = 8 => "float64",
    String = 9 => "string",
    PortableArray = 10 => "portablearray",
    ByteArray = 11 => "bytearray",
    BoolArray = 12 => "boolarray",
    CharArray = 13 => "uint16array",
    Int16Array = 14 => "int16array",
    Int32Array = 15 => "int32array",
    Int64Array = 16 => "int64array",
    Float32Array = 17 => "float32array",
    Float64Array = 18 => "float64array",
    StringArray = 19 => "stringarray",
    Decimal = 20 => "decimal",
    DecimalArray = 21 => "decimalarray",
    Time = 22 => "time",
    TimeArray = 23 => "timearray",
    Date = 24 => "date",
    DateArray = 25 => "datearray",
    Timestamp = 26 => "timestamp",
    TimestampArray = 27 => "timestamparray",
    TimestampWithTimezone = 28 => "timestampwithtimezone",
    TimestampWithTimezoneArray = 29 => "timestampwithtimezonearray",
}

impl fmt::Display for PortableFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field layout of one portable class version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    factory_id: i32,
    class_id: i32,
    version: i32,
    fields: Vec<(String, PortableFieldType)>,
}

impl ClassDefinition {
    /// Create a class definition.
    ///
    /// # Errors
    ///
    /// Fails on duplicate field names.
    pub fn new<N: Into<String>>(
        factory_id: i32,
        class_id: i32,
        version: i32,
        fields: impl IntoIterator<Item = (N, PortableFieldType)>,
    ) -> Result<Self, DecodeError> {
        let fields: Vec<(String, PortableFieldType)> =
            fields.into_iter().map(|(n, t)| (n.into(), t)).collect();
        let mut seen = HashSet::with_capacity(fields.len());
        if let Some((dup, _)) = fields.iter().find(|(name, _)| !seen.insert(name.as_str())) {
            return Err(DecodeError::invalid_schema(format!(
                "portable {factory_id}/{class_id} v{version}: duplicate field '{dup}'"
            )));
        }
        Ok(Self {
            factory_id,
            class_id,
            version,
            fields,
        })
    }

    /// Portable factory id.
    #[must_use]
    pub const fn factory_id(&self) -> i32 {
        self.factory_id
    }

    /// Class id within the factory.
    #[must_use]
    pub const fn class_id(&self) -> i32 {
        self.class_id
    }

    /// Class version.
    #[must_use]
    pub const fn version(&self) -> i32 {
        self.version
    }

    /// Fields in definition order.
    #[must_use]
    pub fn fields(&self) -> &[(String, PortableFieldType)] {
        &self.fields
    }
}

/// Structured reader over one portable object.
pub trait PortableReader: FieldReader {
    /// Read a nested portable object.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_portable(&mut self, field: &str) -> Result<Option<PortableObject>, DecodeError>;

    /// Read an array of nested portable objects.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_portable_array(
        &mut self,
        field: &str,
    ) -> Result<Option<Vec<PortableObject>>, DecodeError>;
}

/// Decode a portable object; the resulting columns are sorted by name.
///
/// A field that fails to read becomes a not-decoded column.
pub fn decode_portable<R: PortableReader>(class: &ClassDefinition, reader: &mut R) -> PortableObject {
    let fields: ColumnList = class
        .fields()
        .iter()
        .map(|(name, ty)| {
            read_field(reader, name, *ty).unwrap_or_else(|err| {
                debug!(
                    "portable {}/{} v{}.{name}: {err}",
                    class.factory_id(),
                    class.class_id(),
                    class.version()
                );
                Column::not_decoded(name.as_str())
            })
        })
        .collect();
    PortableObject::new(class.factory_id(), class.class_id(), fields.sorted_by_name())
}

fn read_field<R: PortableReader>(
    reader: &mut R,
    name: &str,
    ty: PortableFieldType,
) -> Result<Column, DecodeError> {
    use PortableFieldType as P;

    match ty {
        P::Byte => read_scalar::<u8, _>(reader, name),
        P::Bool => read_scalar::<bool, _>(reader, name),
        P::Char => read_scalar::<u16, _>(reader, name),
        P::Int16 => read_scalar::<i16, _>(reader, name),
        P::Int32 => read_scalar::<i32, _>(reader, name),
        P::Int64 => read_scalar::<i64, _>(reader, name),
        P::Float32 => read_scalar::<f32, _>(reader, name),
        P::Float64 => read_scalar::<f64, _>(reader, name),
        P::String => read_nullable::<String, _>(reader, name, TypeTag::String),
        P::Decimal => read_nullable::<Decimal, _>(reader, name, TypeTag::JavaDecimal),
        P::Time => read_nullable::<NaiveTime, _>(reader, name, TypeTag::LocalTime),
        P::Date => read_nullable::<NaiveDate, _>(reader, name, TypeTag::LocalDate),
        P::Timestamp => read_nullable::<NaiveDateTime, _>(reader, name, TypeTag::LocalDateTime),
        P::TimestampWithTimezone => {
            read_nullable::<DateTime<FixedOffset>, _>(reader, name, TypeTag::OffsetDateTime)
        }

        P::ByteArray => read_array::<u8, _>(reader, name, TypeTag::ByteArray),
        P::BoolArray => read_array::<bool, _>(reader, name, TypeTag::BoolArray),
        P::CharArray => read_array::<u16, _>(reader, name, TypeTag::UInt16Array),
        P::Int16Array => read_array::<i16, _>(reader, name, TypeTag::Int16Array),
        P::Int32Array => read_array::<i32, _>(reader, name, TypeTag::Int32Array),
        P::Int64Array => read_array::<i64, _>(reader, name, TypeTag::Int64Array),
        P::Float32Array => read_array::<f32, _>(reader, name, TypeTag::Float32Array),
        P::Float64Array => read_array::<f64, _>(reader, name, TypeTag::Float64Array),
        P::StringArray => read_nullable_array::<String, _>(reader, name, TypeTag::StringArray),
        P::DecimalArray => read_nullable_array::<Decimal, _>(reader, name, TypeTag::DecimalArray),
        P::TimeArray => read_nullable_array::<NaiveTime, _>(reader, name, TypeTag::LocalTimeArray),
        P::DateArray => read_nullable_array::<NaiveDate, _>(reader, name, TypeTag::LocalDateArray),
        P::TimestampArray => {
            read_nullable_array::<NaiveDateTime, _>(reader, name, TypeTag::LocalDateTimeArray)
        }
        P::TimestampWithTimezoneArray => read_nullable_array::<DateTime<FixedOffset>, _>(
            reader,
            name,
            TypeTag::OffsetDateTimeArray,
        ),

        P::Portable => {
            let obj = reader.read_portable(name)?;
            Ok(Column::new(name, TypeTag::Portable, obj))
        }
        P::PortableArray => {
            let value = reader.read_portable_array(name)?.map_or(Value::Nil, |objs| {
                Value::List(
                    objs.into_iter()
                        .map(|obj| Column::new("", TypeTag::Portable, obj))
                        .collect(),
                )
            });
            Ok(Column::new(name, TypeTag::JavaArray, value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::FieldMap;
    use rstest::rstest;

    #[test]
    fn test_sorted_by_name() {
        let class = ClassDefinition::new(
            1,
            2,
            0,
            [
                ("name", PortableFieldType::String),
                ("age", PortableFieldType::Int32),
                ("initial", PortableFieldType::Char),
            ],
        )
        .unwrap();
        let mut reader = FieldMap::new()
            .with("name", "jane")
            .with("age", 40)
            .with("initial", 74_u16);
        let obj = decode_portable(&class, &mut reader);
        assert_eq!(obj.factory_id(), 1);
        assert_eq!(obj.class_id(), 2);
        assert_eq!(obj.text(), "age:40\u{00b7}initial:74\u{00b7}name:jane");
    }

    #[test]
    fn test_nested_portables() {
        let inner = PortableObject::new(1, 3, vec![Column::new("v", TypeTag::Int32, 1)]);
        let class = ClassDefinition::new(
            1,
            2,
            0,
            [
                ("one", PortableFieldType::Portable),
                ("many", PortableFieldType::PortableArray),
                ("none", PortableFieldType::Portable),
            ],
        )
        .unwrap();
        let mut reader = FieldMap::new()
            .with("one", inner.clone())
            .with("many", Value::Array(vec![Value::Portable(inner.clone()), Value::Portable(inner)]))
            .with("none", Value::Nil);
        let obj = decode_portable(&class, &mut reader);
        let fields = obj.fields();
        assert_eq!(fields[0].name, "many");
        assert_eq!(fields[0].tag, TypeTag::JavaArray);
        assert_eq!(fields[0].text(), "[v:1, v:1]");
        assert_eq!(fields[1].text(), "-");
        assert_eq!(fields[2].text(), "v:1");
    }

    #[test]
    fn test_missing_field_is_not_decoded() {
        let class =
            ClassDefinition::new(1, 2, 0, [("gone", PortableFieldType::Int64)]).unwrap();
        let obj = decode_portable(&class, &mut FieldMap::new());
        assert_eq!(obj.fields()[0].tag, TypeTag::NotDecoded);
    }

    #[rstest]
    #[case(PortableFieldType::Portable, "portable")]
    #[case(PortableFieldType::Char, "uint16")]
    #[case(PortableFieldType::ByteArray, "bytearray")]
    #[case(PortableFieldType::TimestampWithTimezoneArray, "timestampwithtimezonearray")]
    fn test_type_names(#[case] ty: PortableFieldType, #[case] name: &str) {
        assert_eq!(ty.name(), name);
        assert_eq!(name.parse::<PortableFieldType>(), Ok(ty));
        assert_eq!(PortableFieldType::from_id(ty.id()), Ok(ty));
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let err = ClassDefinition::new(
            1,
            1,
            3,
            [("a", PortableFieldType::Int32), ("a", PortableFieldType::Bool)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::invalid_schema("portable 1/1 v3: duplicate field 'a'")
        );
    }

    #[test]
    fn test_class_definition_accessors() {
        let class = ClassDefinition::new(4, 5, 2, [("x", PortableFieldType::Bool)]).unwrap();
        assert_eq!(
            (class.factory_id(), class.class_id(), class.version()),
            (4, 5, 2)
        );
        assert_eq!(class.fields(), &[("x".to_owned(), PortableFieldType::Bool)]);
    }
}
