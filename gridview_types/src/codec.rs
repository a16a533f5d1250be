//! Per-kind text and JSON projections.
//!
//! Scalar kinds implement [`ScalarKind`]; [`Scalar`], [`Nullable`] and
//! [`ArrayOf`] lift them into full [`Codec`]s, so `ArrayOf<Nullable<Scalar<Int32Kind>>>`
//! is the codec for an array of nullable 32 bit integers without any per-kind
//! code. Composite codecs are written by hand.

use std::marker::PhantomData;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use itertools::Itertools;
use num_bigint::BigInt;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::format;
use crate::sentinel::{NIL, NOT_DECODED, SKIP, UNKNOWN};
use crate::{DecodeError, Decimal, Value};

/// Text and JSON projection for one value kind.
pub trait Codec {
    /// Text form. Never fails; unusable values become a sentinel.
    fn text(value: &Value) -> String;

    /// JSON form.
    ///
    /// # Errors
    ///
    /// Only composite codecs fail, when their embedded encoding is malformed.
    fn json(value: &Value) -> Result<JsonValue, DecodeError>;
}

/// A scalar kind: which [`Value`] variant it reads and how it prints.
pub trait ScalarKind {
    /// Native representation inside [`Value`].
    type Native;

    /// Borrow the native value, if `value` is the right variant.
    fn extract(value: &Value) -> Option<&Self::Native>;

    /// Text form of a native value.
    fn text(native: &Self::Native) -> String;

    /// JSON form of a native value.
    fn json(native: &Self::Native) -> JsonValue;
}

/// Codec for a non-nullable scalar. Any other variant, nil included, is not decoded.
#[derive(Debug)]
pub struct Scalar<K>(PhantomData<K>);

impl<K: ScalarKind> Codec for Scalar<K> {
    fn text(value: &Value) -> String {
        K::extract(value).map_or_else(|| NOT_DECODED.to_owned(), K::text)
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        Ok(K::extract(value).map_or_else(|| JsonValue::String(NOT_DECODED.to_owned()), K::json))
    }
}

/// Tests for nil first, then defers to the inner codec.
#[derive(Debug)]
pub struct Nullable<C>(PhantomData<C>);

impl<C: Codec> Codec for Nullable<C> {
    fn text(value: &Value) -> String {
        match value {
            Value::Nil => NIL.to_owned(),
            other => C::text(other),
        }
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        match value {
            Value::Nil => Ok(JsonValue::Null),
            other => C::json(other),
        }
    }
}

/// Renders `[e1, e2, ...]` by mapping the element codec over an array.
///
/// A nil array is absent and renders as nil.
#[derive(Debug)]
pub struct ArrayOf<C>(PhantomData<C>);

impl<C: Codec> Codec for ArrayOf<C> {
    fn text(value: &Value) -> String {
        match value {
            Value::Array(items) => format!("[{}]", items.iter().map(C::text).join(", ")),
            Value::Nil => NIL.to_owned(),
            _ => NOT_DECODED.to_owned(),
        }
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(C::json)
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            Value::Nil => Ok(JsonValue::Null),
            _ => Ok(JsonValue::String(NOT_DECODED.to_owned())),
        }
    }
}

macro_rules! scalar_kinds {
    ($( $(#[$meta:meta])* $kind:ident($variant:ident: $native:ty) {
        text: $text:expr,
        json: $json:expr $(,)?
    } )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub struct $kind;

            impl ScalarKind for $kind {
                type Native = $native;

                fn extract(value: &Value) -> Option<&$native> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn text(native: &$native) -> String {
                    let f: fn(&$native) -> String = $text;
                    f(native)
                }

                fn json(native: &$native) -> JsonValue {
                    let f: fn(&$native) -> JsonValue = $json;
                    f(native)
                }
            }
        )*
    };
}

scalar_kinds! {
    /// Unsigned byte.
    ByteKind(Byte: u8) { text: |v| v.to_string(), json: |v| JsonValue::from(*v) }
    /// Boolean.
    BoolKind(Bool: bool) { text: |v| v.to_string(), json: |v| JsonValue::Bool(*v) }
    /// Unsigned 16 bit integer.
    UInt16Kind(UInt16: u16) { text: |v| v.to_string(), json: |v| JsonValue::from(*v) }
    /// Signed 8 bit integer.
    Int8Kind(Int8: i8) { text: |v| v.to_string(), json: |v| JsonValue::from(*v) }
    /// Signed 16 bit integer.
    Int16Kind(Int16: i16) { text: |v| v.to_string(), json: |v| JsonValue::from(*v) }
    /// Signed 32 bit integer.
    Int32Kind(Int32: i32) { text: |v| v.to_string(), json: |v| JsonValue::from(*v) }
    /// Signed 64 bit integer.
    Int64Kind(Int64: i64) { text: |v| v.to_string(), json: |v| JsonValue::from(*v) }
    /// 32 bit float.
    Float32Kind(Float32: f32) { text: |v| format::float_text(*v), json: |v| format::float_json(*v) }
    /// 64 bit float.
    Float64Kind(Float64: f64) { text: |v| format::float_text(*v), json: |v| format::float_json(*v) }
    /// String.
    StringKind(String: String) { text: |v| v.clone(), json: |v| JsonValue::String(v.clone()) }
    /// UUID, hyphenated lowercase.
    UuidKind(Uuid: Uuid) { text: |v| v.to_string(), json: |v| JsonValue::String(v.to_string()) }
    /// Decimal. JSON carries it as a string since it cannot round-trip through a float.
    DecimalKind(Decimal: Decimal) { text: |v| v.to_string(), json: |v| JsonValue::String(v.to_string()) }
    /// Big integer, quoted in JSON for the same reason as decimals.
    BigIntegerKind(BigInteger: BigInt) { text: |v| v.to_string(), json: |v| JsonValue::String(v.to_string()) }
    /// Local date.
    LocalDateKind(LocalDate: NaiveDate) {
        text: format::local_date,
        json: |v| JsonValue::String(format::local_date(v)),
    }
    /// Local time.
    LocalTimeKind(LocalTime: NaiveTime) {
        text: format::local_time,
        json: |v| JsonValue::String(format::local_time(v)),
    }
    /// Local date-time.
    LocalDateTimeKind(LocalDateTime: NaiveDateTime) {
        text: format::local_date_time,
        json: |v| JsonValue::String(format::local_date_time(v)),
    }
    /// Offset date-time.
    OffsetDateTimeKind(OffsetDateTime: DateTime<FixedOffset>) {
        text: format::offset_date_time,
        json: |v| JsonValue::String(format::offset_date_time(v)),
    }
    /// `java.util.Date` instant.
    JavaDateKind(JavaDate: DateTime<Utc>) {
        text: format::java_date,
        json: |v| JsonValue::String(format::java_date(v)),
    }
}

/// Compact objects: `name:value; ...` as text, a map as JSON.
#[derive(Debug)]
pub struct CompactCodec;

impl Codec for CompactCodec {
    fn text(value: &Value) -> String {
        match value {
            Value::Compact(obj) => obj.fields().text(),
            Value::Nil => NIL.to_owned(),
            _ => NOT_DECODED.to_owned(),
        }
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        match value {
            Value::Compact(obj) => Ok(obj.fields().to_json()),
            Value::Nil => Ok(JsonValue::Null),
            _ => Err(DecodeError::not_decoded("compact column without a compact value")),
        }
    }
}

/// Portable objects: `name:value` pairs joined by a middle dot, a map as JSON.
#[derive(Debug)]
pub struct PortableCodec;

impl Codec for PortableCodec {
    fn text(value: &Value) -> String {
        match value {
            Value::Portable(obj) => obj.text(),
            Value::Nil => NIL.to_owned(),
            _ => NOT_DECODED.to_owned(),
        }
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        match value {
            Value::Portable(obj) => Ok(obj.fields().to_json()),
            Value::Nil => Ok(JsonValue::Null),
            _ => Err(DecodeError::not_decoded("portable column without a portable value")),
        }
    }
}

/// Embedded JSON: collapsed to one line as text, parsed as JSON.
#[derive(Debug)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn text(value: &Value) -> String {
        match value {
            Value::Json(raw) => format::collapse_json(raw),
            Value::Nil => NIL.to_owned(),
            _ => NOT_DECODED.to_owned(),
        }
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        match value {
            Value::Json(raw) => serde_json::from_str(raw)
                .map_err(|e| DecodeError::not_decoded(format!("invalid embedded JSON: {e}"))),
            Value::Nil => Ok(JsonValue::Null),
            _ => Err(DecodeError::not_decoded("JSON column without JSON text")),
        }
    }
}

/// Java arrays and lists: elements carry their own tags.
#[derive(Debug)]
pub struct ListCodec;

impl Codec for ListCodec {
    fn text(value: &Value) -> String {
        match value {
            Value::List(items) => format!("[{}]", items.iter().map(|c| c.text()).join(", ")),
            Value::Nil => NIL.to_owned(),
            _ => NOT_DECODED.to_owned(),
        }
    }

    fn json(value: &Value) -> Result<JsonValue, DecodeError> {
        match value {
            Value::List(items) => Ok(JsonValue::Array(
                items
                    .iter()
                    .map(|c| c.to_json().unwrap_or_else(|_| JsonValue::String(NOT_DECODED.to_owned())))
                    .collect(),
            )),
            Value::Nil => Ok(JsonValue::Null),
            _ => Ok(JsonValue::String(NOT_DECODED.to_owned())),
        }
    }
}

/// A fixed sentinel, whatever the value.
#[derive(Debug)]
pub struct Sentinel<S>(PhantomData<S>);

/// Text of a [`Sentinel`] codec.
pub trait SentinelText {
    /// The sentinel string.
    const TEXT: &'static str;
}

impl<S: SentinelText> Codec for Sentinel<S> {
    fn text(_value: &Value) -> String {
        S::TEXT.to_owned()
    }

    fn json(_value: &Value) -> Result<JsonValue, DecodeError> {
        Ok(JsonValue::String(S::TEXT.to_owned()))
    }
}

/// `*` for kinds that are never decoded.
#[derive(Debug)]
pub struct NotDecodedText;

impl SentinelText for NotDecodedText {
    const TEXT: &'static str = NOT_DECODED;
}

/// `>` for elided values.
#[derive(Debug)]
pub struct SkipText;

impl SentinelText for SkipText {
    const TEXT: &'static str = SKIP;
}

/// `UNKNOWN` for tags this build does not know.
#[derive(Debug)]
pub struct UnknownText;

impl SentinelText for UnknownText {
    const TEXT: &'static str = UNKNOWN;
}

/// Nil is `-` in text and `null` in JSON.
#[derive(Debug)]
pub struct NilCodec;

impl Codec for NilCodec {
    fn text(_value: &Value) -> String {
        NIL.to_owned()
    }

    fn json(_value: &Value) -> Result<JsonValue, DecodeError> {
        Ok(JsonValue::Null)
    }
}
