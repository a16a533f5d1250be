//! Native representations of tagged values.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::{BigInt, Sign};
use uuid::Uuid;

use crate::{Column, ColumnList};

/// A decoded value.
///
/// Which variant is valid for a column is decided by the column's
/// [`TypeTag`](crate::TypeTag); the registry renders any mismatch as the
/// not-decoded sentinel instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent.
    Nil,
    /// Unsigned byte.
    Byte(u8),
    /// Boolean.
    Bool(bool),
    /// Unsigned 16 bit integer.
    UInt16(u16),
    /// Signed 8 bit integer.
    Int8(i8),
    /// Signed 16 bit integer.
    Int16(i16),
    /// Signed 32 bit integer.
    Int32(i32),
    /// Signed 64 bit integer.
    Int64(i64),
    /// 32 bit float.
    Float32(f32),
    /// 64 bit float.
    Float64(f64),
    /// String, also used for Java class names.
    String(String),
    /// UUID.
    Uuid(Uuid),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// Arbitrary precision integer.
    BigInteger(BigInt),
    /// Date without zone.
    LocalDate(NaiveDate),
    /// Time of day without zone.
    LocalTime(NaiveTime),
    /// Date and time without zone.
    LocalDateTime(NaiveDateTime),
    /// Date and time with a fixed offset.
    OffsetDateTime(DateTime<FixedOffset>),
    /// Instant, as carried by `java.util.Date`.
    JavaDate(DateTime<Utc>),
    /// Homogeneous array; the element kind follows from the array tag.
    Array(Vec<Value>),
    /// Heterogeneous list where every element carries its own tag.
    List(Vec<Column>),
    /// Decoded compact object.
    Compact(CompactObject),
    /// Decoded portable object.
    Portable(PortableObject),
    /// Raw JSON document text.
    Json(String),
}

impl Value {
    /// Whether this is [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

macro_rules! value_from {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for Value {
                fn from(v: $native) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    u8 => Byte,
    bool => Bool,
    u16 => UInt16,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Uuid => Uuid,
    Decimal => Decimal,
    BigInt => BigInteger,
    NaiveDate => LocalDate,
    NaiveTime => LocalTime,
    NaiveDateTime => LocalDateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    DateTime<Utc> => JavaDate,
    CompactObject => Compact,
    PortableObject => Portable,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Nil, Into::into)
    }
}

/// Arbitrary precision decimal: `unscaled * 10^-scale`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i32,
}

impl Decimal {
    /// Create a decimal from its unscaled value and scale.
    pub fn new(unscaled: impl Into<BigInt>, scale: i32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }

    /// The unscaled integer.
    #[must_use]
    pub const fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of digits to the right of the decimal point.
    #[must_use]
    pub const fn scale(&self) -> i32 {
        self.scale
    }
}

/// Canonical decimal text: plain notation while the scale is non-negative and
/// the adjusted exponent is at least -6, scientific notation otherwise.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        if self.unscaled.sign() == Sign::Minus {
            f.write_str("-")?;
        }
        let scale = i64::from(self.scale);
        let len = digits.len() as i64;
        let adjusted = len - 1 - scale;

        if scale >= 0 && adjusted >= -6 {
            if scale == 0 {
                return f.write_str(&digits);
            }
            if len > scale {
                let (int_part, frac_part) = digits.split_at((len - scale) as usize);
                return write!(f, "{int_part}.{frac_part}");
            }
            let zeros = "0".repeat((scale - len) as usize);
            return write!(f, "0.{zeros}{digits}");
        }

        let (first, rest) = digits.split_at(1);
        f.write_str(first)?;
        if !rest.is_empty() {
            write!(f, ".{rest}")?;
        }
        if adjusted >= 0 {
            write!(f, "E+{adjusted}")
        } else {
            write!(f, "E{adjusted}")
        }
    }
}

/// A compact object decoded against its schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompactObject {
    type_name: String,
    fields: ColumnList,
}

impl CompactObject {
    /// Create a compact object; `fields` are kept in schema order.
    pub fn new(type_name: impl Into<String>, fields: impl Into<ColumnList>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: fields.into(),
        }
    }

    /// Schema type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Decoded fields in schema order.
    #[must_use]
    pub const fn fields(&self) -> &ColumnList {
        &self.fields
    }
}

/// A portable object decoded against its class definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortableObject {
    factory_id: i32,
    class_id: i32,
    fields: ColumnList,
}

impl PortableObject {
    /// Create a portable object.
    pub fn new(factory_id: i32, class_id: i32, fields: impl Into<ColumnList>) -> Self {
        Self {
            factory_id,
            class_id,
            fields: fields.into(),
        }
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

    /// Decoded fields, sorted by name.
    #[must_use]
    pub const fn fields(&self) -> &ColumnList {
        &self.fields
    }

    /// `name:value` pairs joined with a middle dot.
    #[must_use]
    pub fn text(&self) -> String {
        self.fields
            .iter()
            .map(|c| format!("{}:{}", c.name, c.text()))
            .collect::<Vec<_>>()
            .join("\u{00b7}")
    }
}
