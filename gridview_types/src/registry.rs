//! Tag to codec dispatch.
//!
//! One exhaustive match decides the codec for every [`TypeTag`]; adding a tag
//! without deciding how it renders does not compile.

use serde_json::Value as JsonValue;

use crate::codec::{
    ArrayOf, BigIntegerKind, BoolKind, ByteKind, Codec, CompactCodec, DecimalKind, Float32Kind,
    Float64Kind, Int8Kind, Int16Kind, Int32Kind, Int64Kind, JavaDateKind, JsonCodec, ListCodec,
    LocalDateKind, LocalDateTimeKind, LocalTimeKind, NilCodec, NotDecodedText, Nullable,
    OffsetDateTimeKind, PortableCodec, Scalar, Sentinel, SkipText, StringKind, UInt16Kind,
    UnknownText, UuidKind,
};
use crate::decode::decode_json;
use crate::{Column, DecodeError, TypeTag, Value};

macro_rules! dispatch {
    ($tag:expr, $method:ident($value:expr)) => {
        match $tag {
            TypeTag::Nil => NilCodec::$method($value),

            TypeTag::Byte => Scalar::<ByteKind>::$method($value),
            TypeTag::Bool => Scalar::<BoolKind>::$method($value),
            TypeTag::UInt16 => Scalar::<UInt16Kind>::$method($value),
            TypeTag::Int8 => Scalar::<Int8Kind>::$method($value),
            TypeTag::Int16 => Scalar::<Int16Kind>::$method($value),
            TypeTag::Int32 => Scalar::<Int32Kind>::$method($value),
            TypeTag::Int64 => Scalar::<Int64Kind>::$method($value),
            TypeTag::Float32 => Scalar::<Float32Kind>::$method($value),
            TypeTag::Float64 => Scalar::<Float64Kind>::$method($value),

            TypeTag::String | TypeTag::JavaClass => Nullable::<Scalar<StringKind>>::$method($value),
            TypeTag::Uuid => Nullable::<Scalar<UuidKind>>::$method($value),
            TypeTag::JavaDecimal => Nullable::<Scalar<DecimalKind>>::$method($value),
            TypeTag::JavaBigInteger => Nullable::<Scalar<BigIntegerKind>>::$method($value),
            TypeTag::JavaDate => Nullable::<Scalar<JavaDateKind>>::$method($value),
            TypeTag::LocalDate => Nullable::<Scalar<LocalDateKind>>::$method($value),
            TypeTag::LocalTime => Nullable::<Scalar<LocalTimeKind>>::$method($value),
            TypeTag::LocalDateTime => Nullable::<Scalar<LocalDateTimeKind>>::$method($value),
            TypeTag::OffsetDateTime => Nullable::<Scalar<OffsetDateTimeKind>>::$method($value),

            TypeTag::NullableBool => Nullable::<Scalar<BoolKind>>::$method($value),
            TypeTag::NullableInt8 => Nullable::<Scalar<Int8Kind>>::$method($value),
            TypeTag::NullableInt16 => Nullable::<Scalar<Int16Kind>>::$method($value),
            TypeTag::NullableInt32 => Nullable::<Scalar<Int32Kind>>::$method($value),
            TypeTag::NullableInt64 => Nullable::<Scalar<Int64Kind>>::$method($value),
            TypeTag::NullableFloat32 => Nullable::<Scalar<Float32Kind>>::$method($value),
            TypeTag::NullableFloat64 => Nullable::<Scalar<Float64Kind>>::$method($value),

            TypeTag::ByteArray => ArrayOf::<Scalar<ByteKind>>::$method($value),
            TypeTag::BoolArray => ArrayOf::<Scalar<BoolKind>>::$method($value),
            TypeTag::UInt16Array => ArrayOf::<Scalar<UInt16Kind>>::$method($value),
            TypeTag::Int8Array => ArrayOf::<Scalar<Int8Kind>>::$method($value),
            TypeTag::Int16Array => ArrayOf::<Scalar<Int16Kind>>::$method($value),
            TypeTag::Int32Array => ArrayOf::<Scalar<Int32Kind>>::$method($value),
            TypeTag::Int64Array => ArrayOf::<Scalar<Int64Kind>>::$method($value),
            TypeTag::Float32Array => ArrayOf::<Scalar<Float32Kind>>::$method($value),
            TypeTag::Float64Array => ArrayOf::<Scalar<Float64Kind>>::$method($value),
            TypeTag::StringArray => ArrayOf::<Nullable<Scalar<StringKind>>>::$method($value),
            TypeTag::DecimalArray => ArrayOf::<Nullable<Scalar<DecimalKind>>>::$method($value),
            TypeTag::LocalDateArray => ArrayOf::<Nullable<Scalar<LocalDateKind>>>::$method($value),
            TypeTag::LocalTimeArray => ArrayOf::<Nullable<Scalar<LocalTimeKind>>>::$method($value),
            TypeTag::LocalDateTimeArray => {
                ArrayOf::<Nullable<Scalar<LocalDateTimeKind>>>::$method($value)
            }
            TypeTag::OffsetDateTimeArray => {
                ArrayOf::<Nullable<Scalar<OffsetDateTimeKind>>>::$method($value)
            }

            TypeTag::NullableBoolArray => ArrayOf::<Nullable<Scalar<BoolKind>>>::$method($value),
            TypeTag::NullableInt8Array => ArrayOf::<Nullable<Scalar<Int8Kind>>>::$method($value),
            TypeTag::NullableInt16Array => ArrayOf::<Nullable<Scalar<Int16Kind>>>::$method($value),
            TypeTag::NullableInt32Array => ArrayOf::<Nullable<Scalar<Int32Kind>>>::$method($value),
            TypeTag::NullableInt64Array => ArrayOf::<Nullable<Scalar<Int64Kind>>>::$method($value),
            TypeTag::NullableFloat32Array => {
                ArrayOf::<Nullable<Scalar<Float32Kind>>>::$method($value)
            }
            TypeTag::NullableFloat64Array => {
                ArrayOf::<Nullable<Scalar<Float64Kind>>>::$method($value)
            }

            TypeTag::Compact => CompactCodec::$method($value),
            TypeTag::Portable => PortableCodec::$method($value),
            TypeTag::Json => JsonCodec::$method($value),
            TypeTag::CompactArray => ArrayOf::<Nullable<CompactCodec>>::$method($value),
            TypeTag::JsonArray => ArrayOf::<Nullable<JsonCodec>>::$method($value),
            TypeTag::JavaArray | TypeTag::JavaArrayList | TypeTag::JavaLinkedList => {
                ListCodec::$method($value)
            }

            TypeTag::DataSerializable
            | TypeTag::SimpleEntry
            | TypeTag::SimpleImmutableEntry
            | TypeTag::JavaCopyOnWriteArrayList
            | TypeTag::JavaHashMap
            | TypeTag::JavaConcurrentSkipListMap
            | TypeTag::JavaConcurrentHashMap
            | TypeTag::JavaLinkedHashMap
            | TypeTag::JavaTreeMap
            | TypeTag::JavaHashSet
            | TypeTag::JavaTreeSet
            | TypeTag::JavaLinkedHashSet
            | TypeTag::JavaCopyOnWriteArraySet
            | TypeTag::JavaConcurrentSkipListSet
            | TypeTag::JavaArrayDeque
            | TypeTag::JavaLinkedBlockingQueue
            | TypeTag::JavaArrayBlockingQueue
            | TypeTag::JavaPriorityBlockingQueue
            | TypeTag::JavaDelayQueue
            | TypeTag::JavaSynchronousQueue
            | TypeTag::JavaLinkedTransferQueue
            | TypeTag::JavaPriorityQueue
            | TypeTag::JavaOptional
            | TypeTag::CompactWithSchema
            | TypeTag::JavaSerializable
            | TypeTag::JavaExternalizable
            | TypeTag::CsharpClr
            | TypeTag::PythonPickle
            | TypeTag::Gob
            | TypeTag::Hibernate3CacheKey
            | TypeTag::Hibernate3CacheEntry
            | TypeTag::Hibernate4CacheKey
            | TypeTag::Hibernate4CacheEntry
            | TypeTag::Hibernate5CacheKey
            | TypeTag::Hibernate5CacheEntry
            | TypeTag::Hibernate5NaturalIdKey
            | TypeTag::JetSerializerFirst
            | TypeTag::JetSerializerLast
            | TypeTag::NotDecoded => Sentinel::<NotDecodedText>::$method($value),

            TypeTag::Skip => Sentinel::<SkipText>::$method($value),
            TypeTag::Unknown => Sentinel::<UnknownText>::$method($value),
        }
    };
}

impl TypeTag {
    /// Text form of `value` under this tag. Never fails.
    #[must_use]
    pub fn stringify(self, value: &Value) -> String {
        dispatch!(self, text(value))
    }

    /// JSON form of `value` under this tag.
    ///
    /// # Errors
    ///
    /// Fails only for composite tags whose embedded encoding is malformed.
    pub fn to_json(self, value: &Value) -> Result<JsonValue, DecodeError> {
        dispatch!(self, json(value))
    }

    /// Sub-columns of `value`.
    ///
    /// Compact fields keep schema order, portable fields come sorted by name,
    /// embedded JSON objects yield their keys in sorted order and any other JSON
    /// document yields one unnamed column. Plain scalars yield themselves as a
    /// single unnamed column.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NotDecoded`] when a composite value cannot be interpreted,
    /// [`DecodeError::NotFlattenable`] for the sentinel tags.
    pub fn flatten(self, value: &Value) -> Result<Vec<Column>, DecodeError> {
        match (self, value) {
            (Self::Compact, Value::Compact(obj)) => Ok(obj.fields().to_vec()),
            (Self::Portable, Value::Portable(obj)) => Ok(obj.fields().to_vec()),
            (Self::Json, Value::Json(raw)) => Ok(decode_json(raw)?.into_vec()),
            (Self::Compact | Self::Portable | Self::Json, _) => Err(DecodeError::not_decoded(
                format!("{self} column holds a value of another kind"),
            )),
            (Self::Skip | Self::NotDecoded | Self::Unknown, _) => {
                Err(DecodeError::NotFlattenable(self))
            }
            _ => Ok(vec![Column::new("", self, value.clone())]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::{NIL, NOT_DECODED, SKIP, UNKNOWN};
    use crate::{CompactObject, Decimal, PortableObject};
    use chrono::NaiveDate;
    use quickcheck::quickcheck;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(TypeTag::Int32, Value::Int32(-7), "-7")]
    #[case(TypeTag::Bool, Value::Bool(false), "false")]
    #[case(TypeTag::Byte, Value::Byte(255), "255")]
    #[case(TypeTag::Float64, Value::Float64(2.5), "2.5")]
    #[case(TypeTag::String, Value::String("hello".into()), "hello")]
    #[case(TypeTag::String, Value::Nil, NIL)]
    #[case(TypeTag::JavaDecimal, Value::Decimal(Decimal::new(100, 10)), "1.00E-8")]
    #[case(TypeTag::NullableInt64, Value::Nil, NIL)]
    #[case(TypeTag::Int32Array, Value::Array(vec![Value::Int32(1), Value::Int32(2)]), "[1, 2]")]
    #[case(TypeTag::Int32Array, Value::Array(vec![]), "[]")]
    #[case(TypeTag::Skip, Value::Nil, SKIP)]
    #[case(TypeTag::Unknown, Value::Int32(1), UNKNOWN)]
    #[case(TypeTag::JavaHashMap, Value::Nil, NOT_DECODED)]
    #[case(TypeTag::Int32, Value::String("1".into()), NOT_DECODED)]
    fn test_stringify(#[case] tag: TypeTag, #[case] value: Value, #[case] expected: &str) {
        assert_eq!(tag.stringify(&value), expected);
    }

    #[test]
    fn test_local_date() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert_eq!(TypeTag::LocalDate.stringify(&Value::LocalDate(d)), "2023-01-02");
        assert_eq!(TypeTag::LocalDate.to_json(&Value::LocalDate(d)), Ok(json!("2023-01-02")));
    }

    #[test]
    fn test_every_tag_survives_nil_and_garbage() {
        for tag in TypeTag::ALL {
            let _ = tag.stringify(&Value::Nil);
            let _ = tag.stringify(&Value::Json("not json".into()));
            let _ = tag.to_json(&Value::Nil);
        }
    }

    #[test]
    fn test_nullable_tags_render_nil() {
        let nullable = [
            TypeTag::String,
            TypeTag::JavaDecimal,
            TypeTag::LocalDate,
            TypeTag::NullableBool,
            TypeTag::NullableInt8,
            TypeTag::NullableFloat64,
            TypeTag::NullableInt32Array,
            TypeTag::CompactArray,
        ];
        for tag in nullable {
            assert_eq!(tag.stringify(&Value::Nil), NIL, "{tag}");
        }
    }

    #[test]
    fn test_compact_text_and_json() {
        let obj = CompactObject::new(
            "point",
            vec![
                Column::new("x", TypeTag::Int32, 1),
                Column::new("label", TypeTag::String, Value::Nil),
            ],
        );
        let v = Value::Compact(obj);
        assert_eq!(TypeTag::Compact.stringify(&v), "x:1; label:-");
        assert_eq!(TypeTag::Compact.to_json(&v), Ok(json!({"x": 1, "label": null})));
    }

    #[test]
    fn test_portable_text_uses_middle_dot() {
        let obj = PortableObject::new(
            1,
            2,
            vec![
                Column::new("a", TypeTag::Int32, 1),
                Column::new("b", TypeTag::String, "x"),
            ],
        );
        assert_eq!(TypeTag::Portable.stringify(&Value::Portable(obj)), "a:1\u{00b7}b:x");
    }

    #[test]
    fn test_flatten_json_object() {
        let cols = TypeTag::Json
            .flatten(&Value::Json(r#"{"b":"x","a":1}"#.into()))
            .unwrap();
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(cols[0].tag, TypeTag::Int64);
        assert_eq!(cols[1].tag, TypeTag::String);
    }

    #[test]
    fn test_flatten_json_scalar() {
        let cols = TypeTag::Json.flatten(&Value::Json("42.5".into())).unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].name, "");
        assert_eq!(cols[0].tag, TypeTag::Float64);
    }

    #[test]
    fn test_flatten_errors() {
        assert!(matches!(
            TypeTag::Json.flatten(&Value::Json("{".into())),
            Err(DecodeError::NotDecoded(_))
        ));
        assert_eq!(
            TypeTag::Skip.flatten(&Value::Nil),
            Err(DecodeError::NotFlattenable(TypeTag::Skip))
        );
    }

    quickcheck! {
        fn prop_stringify_is_deterministic(v: i64, s: String, b: bool) -> bool {
            let cases = [
                (TypeTag::Int64, Value::Int64(v)),
                (TypeTag::String, Value::String(s)),
                (TypeTag::Bool, Value::Bool(b)),
                (TypeTag::Float64, Value::Float64(v as f64 / 7.0)),
            ];
            cases.iter().all(|(tag, value)| tag.stringify(value) == tag.stringify(value))
        }

        fn prop_int_arrays_bracket_and_count(items: Vec<i32>) -> bool {
            let value = Value::Array(items.iter().copied().map(Value::Int32).collect());
            let text = TypeTag::Int32Array.stringify(&value);
            let inner = &text[1..text.len() - 1];
            text.starts_with('[')
                && text.ends_with(']')
                && (items.is_empty() || inner.split(", ").count() == items.len())
        }
    }
}
