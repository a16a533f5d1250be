//! Composite decoders.
//!
//! Each decoder turns one composite value into an ordered list of [`Column`]s.
//! Compact objects keep their schema order, portable objects are sorted by
//! field name and embedded JSON objects are sorted by key.
//!
//! The structured readers are the client's; this module only names the
//! operations it needs from them ([`FieldReader`], [`CompactReader`],
//! [`PortableReader`]) and ships [`FieldMap`], an in-memory implementation.

mod compact;
mod field_map;
mod json;
mod portable;

pub use compact::*;
pub use field_map::*;
pub use json::*;
pub use portable::*;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{Column, DecodeError, Decimal, TypeTag, Value};

/// A native field type a structured reader can produce.
pub trait Primitive: Sized {
    /// Tag of a single value.
    const TAG: TypeTag;

    /// Wrap into a [`Value`].
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`] of the matching variant.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! primitives {
    ($($native:ty => $variant:ident, $tag:ident;)*) => {
        $(
            impl Primitive for $native {
                const TAG: TypeTag = TypeTag::$tag;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

primitives! {
    bool => Bool, Bool;
    u8 => Byte, Byte;
    u16 => UInt16, UInt16;
    i8 => Int8, Int8;
    i16 => Int16, Int16;
    i32 => Int32, Int32;
    i64 => Int64, Int64;
    f32 => Float32, Float32;
    f64 => Float64, Float64;
    String => String, String;
    Decimal => Decimal, JavaDecimal;
    NaiveDate => LocalDate, LocalDate;
    NaiveTime => LocalTime, LocalTime;
    NaiveDateTime => LocalDateTime, LocalDateTime;
    DateTime<FixedOffset> => OffsetDateTime, OffsetDateTime;
}

/// Field access shared by the compact and portable readers.
///
/// `None` means the field holds null.
pub trait FieldReader {
    /// Read a non-nullable field.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read<T: Primitive>(&mut self, field: &str) -> Result<T, DecodeError>;

    /// Read a nullable field.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_nullable<T: Primitive>(&mut self, field: &str) -> Result<Option<T>, DecodeError>;

    /// Read an array of non-nullable elements.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_array<T: Primitive>(&mut self, field: &str) -> Result<Option<Vec<T>>, DecodeError>;

    /// Read an array whose elements may be null.
    ///
    /// # Errors
    ///
    /// Fails when the field is missing or holds another type.
    fn read_array_of_nullable<T: Primitive>(
        &mut self,
        field: &str,
    ) -> Result<Option<Vec<Option<T>>>, DecodeError>;
}

fn scalar_column<T: Primitive>(name: &str, tag: TypeTag, value: T) -> Column {
    Column::new(name, tag, value.into_value())
}

fn nullable_column<T: Primitive>(name: &str, tag: TypeTag, value: Option<T>) -> Column {
    Column::new(name, tag, value.map_or(Value::Nil, Primitive::into_value))
}

fn array_column<T: Primitive>(name: &str, tag: TypeTag, values: Option<Vec<T>>) -> Column {
    let value = values.map_or(Value::Nil, |vs| {
        Value::Array(vs.into_iter().map(Primitive::into_value).collect())
    });
    Column::new(name, tag, value)
}

fn nullable_array_column<T: Primitive>(
    name: &str,
    tag: TypeTag,
    values: Option<Vec<Option<T>>>,
) -> Column {
    let value = values.map_or(Value::Nil, |vs| {
        Value::Array(
            vs.into_iter()
                .map(|v| v.map_or(Value::Nil, Primitive::into_value))
                .collect(),
        )
    });
    Column::new(name, tag, value)
}

/// Read one field of a known primitive type into a column.
fn read_scalar<T: Primitive, R: FieldReader>(reader: &mut R, name: &str) -> Result<Column, DecodeError> {
    Ok(scalar_column(name, T::TAG, reader.read::<T>(name)?))
}

fn read_nullable<T: Primitive, R: FieldReader>(
    reader: &mut R,
    name: &str,
    tag: TypeTag,
) -> Result<Column, DecodeError> {
    Ok(nullable_column(name, tag, reader.read_nullable::<T>(name)?))
}

fn read_array<T: Primitive, R: FieldReader>(
    reader: &mut R,
    name: &str,
    tag: TypeTag,
) -> Result<Column, DecodeError> {
    Ok(array_column(name, tag, reader.read_array::<T>(name)?))
}

fn read_nullable_array<T: Primitive, R: FieldReader>(
    reader: &mut R,
    name: &str,
    tag: TypeTag,
) -> Result<Column, DecodeError> {
    Ok(nullable_array_column(
        name,
        tag,
        reader.read_array_of_nullable::<T>(name)?,
    ))
}
