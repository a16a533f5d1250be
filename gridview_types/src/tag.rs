//! The closed set of value kinds.
//!
//! Ids match the data grid's serialization ids where the grid defines one.
//! Kinds that only exist on this side (int8, the nullable variants, arrays of
//! date/time/decimal/compact/JSON values and the sentinels) live in a private
//! range below -1000 so they can never collide with a wire id.

use std::fmt;

use crate::DecodeError;

macro_rules! type_tags {
    ($( $(#[$meta:meta])* $variant:ident = $id:literal => $label:literal, )*) => {
        /// Runtime kind of a value.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum TypeTag {
            $( $(#[$meta])* $variant = $id, )*
        }

        impl TypeTag {
            /// Every tag, in declaration order.
            pub const ALL: &'static [TypeTag] = &[$(TypeTag::$variant,)*];

            /// The numeric id of this tag.
            #[must_use]
            pub const fn id(self) -> i32 {
                self as i32
            }

            /// Upper-case display name, used for the key-type and value-type columns.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(TypeTag::$variant => $label,)*
                }
            }

            /// Resolve a numeric id.
            ///
            /// # Errors
            ///
            /// Returns [`DecodeError::UnknownType`] if no tag has this id.
            pub const fn from_id(id: i32) -> Result<Self, DecodeError> {
                match id {
                    $($id => Ok(TypeTag::$variant),)*
                    other => Err(DecodeError::UnknownType(other)),
                }
            }
        }
    };
}

type_tags! {
    /// Absent value.
    Nil = 0 => "NIL",
    /// Portable composite.
    Portable = -1 => "PORTABLE",
    /// Identified data serializable (never decoded).
    DataSerializable = -2 => "DATA_SERIALIZABLE",
    /// Unsigned byte.
    Byte = -3 => "BYTE",
    /// Boolean.
    Bool = -4 => "BOOL",
    /// Unsigned 16 bit integer (a Java char).
    UInt16 = -5 => "UINT16",
    /// Signed 16 bit integer.
    Int16 = -6 => "INT16",
    /// Signed 32 bit integer.
    Int32 = -7 => "INT32",
    /// Signed 64 bit integer.
    Int64 = -8 => "INT64",
    /// 32 bit float.
    Float32 = -9 => "FLOAT32",
    /// 64 bit float.
    Float64 = -10 => "FLOAT64",
    /// UTF-8 string.
    String = -11 => "STRING",
    /// Array of bytes.
    ByteArray = -12 => "BYTE_ARRAY",
    /// Array of booleans.
    BoolArray = -13 => "BOOL_ARRAY",
    /// Array of unsigned 16 bit integers.
    UInt16Array = -14 => "UINT16_ARRAY",
    /// Array of 16 bit integers.
    Int16Array = -15 => "INT16_ARRAY",
    /// Array of 32 bit integers.
    Int32Array = -16 => "INT32_ARRAY",
    /// Array of 64 bit integers.
    Int64Array = -17 => "INT64_ARRAY",
    /// Array of 32 bit floats.
    Float32Array = -18 => "FLOAT32_ARRAY",
    /// Array of 64 bit floats.
    Float64Array = -19 => "FLOAT64_ARRAY",
    /// Array of strings.
    StringArray = -20 => "STRING_ARRAY",
    /// UUID.
    Uuid = -21 => "UUID",
    /// `AbstractMap.SimpleEntry`.
    SimpleEntry = -22 => "SIMPLE_ENTRY",
    /// `AbstractMap.SimpleImmutableEntry`.
    SimpleImmutableEntry = -23 => "SIMPLE_IMMUTABLE_ENTRY",
    /// Java class name.
    JavaClass = -24 => "JAVA_CLASS",
    /// `java.util.Date`.
    JavaDate = -25 => "JAVA_DATE",
    /// `java.math.BigInteger`.
    JavaBigInteger = -26 => "JAVA_BIG_INTEGER",
    /// `java.math.BigDecimal`.
    JavaDecimal = -27 => "JAVA_DECIMAL",
    /// Java object array.
    JavaArray = -28 => "JAVA_ARRAY",
    /// `java.util.ArrayList`.
    JavaArrayList = -29 => "JAVA_ARRAY_LIST",
    /// `java.util.LinkedList`.
    JavaLinkedList = -30 => "JAVA_LINKED_LIST",
    /// `CopyOnWriteArrayList`.
    JavaCopyOnWriteArrayList = -31 => "JAVA_COPY_ON_WRITE_ARRAY_LIST",
    /// `HashMap`.
    JavaHashMap = -32 => "JAVA_HASH_MAP",
    /// `ConcurrentSkipListMap`.
    JavaConcurrentSkipListMap = -33 => "JAVA_CONCURRENT_SKIP_LIST_MAP",
    /// `ConcurrentHashMap`.
    JavaConcurrentHashMap = -34 => "JAVA_CONCURRENT_HASH_MAP",
    /// `LinkedHashMap`.
    JavaLinkedHashMap = -35 => "JAVA_LINKED_HASH_MAP",
    /// `TreeMap`.
    JavaTreeMap = -36 => "JAVA_TREE_MAP",
    /// `HashSet`.
    JavaHashSet = -37 => "JAVA_HASH_SET",
    /// `TreeSet`.
    JavaTreeSet = -38 => "JAVA_TREE_SET",
    /// `LinkedHashSet`.
    JavaLinkedHashSet = -39 => "JAVA_LINKED_HASH_SET",
    /// `CopyOnWriteArraySet`.
    JavaCopyOnWriteArraySet = -40 => "JAVA_COPY_ON_WRITE_ARRAY_SET",
    /// `ConcurrentSkipListSet`.
    JavaConcurrentSkipListSet = -41 => "JAVA_CONCURRENT_SKIP_LIST_SET",
    /// `ArrayDeque`.
    JavaArrayDeque = -42 => "JAVA_ARRAY_DEQUE",
    /// `LinkedBlockingQueue`.
    JavaLinkedBlockingQueue = -43 => "JAVA_LINKED_BLOCKING_QUEUE",
    /// `ArrayBlockingQueue`.
    JavaArrayBlockingQueue = -44 => "JAVA_ARRAY_BLOCKING_QUEUE",
    /// `PriorityBlockingQueue`.
    JavaPriorityBlockingQueue = -45 => "JAVA_PRIORITY_BLOCKING_QUEUE",
    /// `DelayQueue`.
    JavaDelayQueue = -46 => "JAVA_DELAY_QUEUE",
    /// `SynchronousQueue`.
    JavaSynchronousQueue = -47 => "JAVA_SYNCHRONOUS_QUEUE",
    /// `LinkedTransferQueue`.
    JavaLinkedTransferQueue = -48 => "JAVA_LINKED_TRANSFER_QUEUE",
    /// `PriorityQueue`.
    JavaPriorityQueue = -49 => "JAVA_PRIORITY_QUEUE",
    /// `Optional`.
    JavaOptional = -50 => "JAVA_OPTIONAL",
    /// `java.time.LocalDate`.
    LocalDate = -51 => "JAVA_LOCALDATE",
    /// `java.time.LocalTime`.
    LocalTime = -52 => "JAVA_LOCALTIME",
    /// `java.time.LocalDateTime`.
    LocalDateTime = -53 => "JAVA_LOCALDATETIME",
    /// `java.time.OffsetDateTime`.
    OffsetDateTime = -54 => "JAVA_OFFSETDATETIME",
    /// Compact composite.
    Compact = -55 => "COMPACT",
    /// Compact composite carrying its own schema (never decoded).
    CompactWithSchema = -56 => "COMPACT_WITH_SCHEMA",
    /// Java serializable.
    JavaSerializable = -100 => "JAVA_SERIALIZABLE",
    /// Java externalizable.
    JavaExternalizable = -101 => "JAVA_EXTERNALIZABLE",
    /// .NET CLR serialization.
    CsharpClr = -110 => "CSHARP_CLR_SERIALIZATION",
    /// Python pickle.
    PythonPickle = -120 => "PYTHON_PICKLE_SERIALIZATION",
    /// Embedded JSON document.
    Json = -130 => "JSON",
    /// Go gob.
    Gob = -140 => "GO_GOB_SERIALIZATION",
    /// Hibernate 3 cache key.
    Hibernate3CacheKey = -200 => "HIBERNATE3_CACHE_KEY",
    /// Hibernate 3 cache entry.
    Hibernate3CacheEntry = -201 => "HIBERNATE3_CACHE_ENTRY",
    /// Hibernate 4 cache key.
    Hibernate4CacheKey = -202 => "HIBERNATE4_CACHE_KEY",
    /// Hibernate 4 cache entry.
    Hibernate4CacheEntry = -203 => "HIBERNATE4_CACHE_ENTRY",
    /// Hibernate 5 cache key.
    Hibernate5CacheKey = -204 => "HIBERNATE5_CACHE_KEY",
    /// Hibernate 5 cache entry.
    Hibernate5CacheEntry = -205 => "HIBERNATE5_CACHE_ENTRY",
    /// Hibernate 5 natural id key.
    Hibernate5NaturalIdKey = -206 => "HIBERNATE5_NATURAL_ID_KEY",
    /// First Jet serializer id.
    JetSerializerFirst = -300 => "JET_SERIALIZER_FIRST",
    /// Last Jet serializer id.
    JetSerializerLast = -399 => "JET_SERIALIZER_LAST",

    /// Signed 8 bit integer.
    Int8 = -1001 => "INT8",
    /// Array of 8 bit integers.
    Int8Array = -1002 => "INT8_ARRAY",
    /// Array of decimals.
    DecimalArray = -1003 => "DECIMAL_ARRAY",
    /// Array of local dates.
    LocalDateArray = -1004 => "JAVA_LOCALDATE_ARRAY",
    /// Array of local times.
    LocalTimeArray = -1005 => "JAVA_LOCALTIME_ARRAY",
    /// Array of local date-times.
    LocalDateTimeArray = -1006 => "JAVA_LOCALDATETIME_ARRAY",
    /// Array of offset date-times.
    OffsetDateTimeArray = -1007 => "JAVA_OFFSETDATETIME_ARRAY",
    /// Array of compact composites.
    CompactArray = -1008 => "COMPACT_ARRAY",
    /// Array of embedded JSON documents.
    JsonArray = -1009 => "JSON_ARRAY",
    /// Boolean or nil.
    NullableBool = -1010 => "NULLABLE_BOOL",
    /// 8 bit integer or nil.
    NullableInt8 = -1011 => "NULLABLE_INT8",
    /// 16 bit integer or nil.
    NullableInt16 = -1012 => "NULLABLE_INT16",
    /// 32 bit integer or nil.
    NullableInt32 = -1013 => "NULLABLE_INT32",
    /// 64 bit integer or nil.
    NullableInt64 = -1014 => "NULLABLE_INT64",
    /// 32 bit float or nil.
    NullableFloat32 = -1015 => "NULLABLE_FLOAT32",
    /// 64 bit float or nil.
    NullableFloat64 = -1016 => "NULLABLE_FLOAT64",
    /// Array of nullable booleans.
    NullableBoolArray = -1017 => "NULLABLE_BOOL_ARRAY",
    /// Array of nullable 8 bit integers.
    NullableInt8Array = -1018 => "NULLABLE_INT8_ARRAY",
    /// Array of nullable 16 bit integers.
    NullableInt16Array = -1019 => "NULLABLE_INT16_ARRAY",
    /// Array of nullable 32 bit integers.
    NullableInt32Array = -1020 => "NULLABLE_INT32_ARRAY",
    /// Array of nullable 64 bit integers.
    NullableInt64Array = -1021 => "NULLABLE_INT64_ARRAY",
    /// Array of nullable 32 bit floats.
    NullableFloat32Array = -1022 => "NULLABLE_FLOAT32_ARRAY",
    /// Array of nullable 64 bit floats.
    NullableFloat64Array = -1023 => "NULLABLE_FLOAT64_ARRAY",

    /// A tag this build does not know.
    Unknown = -1100 => "UNKNOWN",
    /// Value elided from rendering.
    Skip = -1101 => "SKIP",
    /// Decoding was attempted and failed.
    NotDecoded = -1102 => "NOT_DECODED",
}

impl TypeTag {
    /// Whether values of this tag can be broken out into sub-columns.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Compact | Self::Portable | Self::Json)
    }

    /// Whether values of this tag are numbers, which tables align to the right.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Int8
                | Self::UInt16
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Float32
                | Self::Float64
                | Self::NullableInt8
                | Self::NullableInt16
                | Self::NullableInt32
                | Self::NullableInt64
                | Self::NullableFloat32
                | Self::NullableFloat64
                | Self::JavaBigInteger
                | Self::JavaDecimal
        )
    }
}

impl TryFrom<i32> for TypeTag {
    type Error = DecodeError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<i32> = TypeTag::ALL.iter().map(|t| t.id()).collect();
        assert_eq!(ids.len(), TypeTag::ALL.len());
    }

    #[test]
    fn test_every_id_resolves_to_itself() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_id(tag.id()), Ok(*tag));
        }
    }

    #[rstest]
    #[case(0, TypeTag::Nil)]
    #[case(-7, TypeTag::Int32)]
    #[case(-27, TypeTag::JavaDecimal)]
    #[case(-55, TypeTag::Compact)]
    #[case(-130, TypeTag::Json)]
    fn test_wire_ids(#[case] id: i32, #[case] expected: TypeTag) {
        assert_eq!(TypeTag::try_from(id), Ok(expected));
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(TypeTag::from_id(-9999), Err(DecodeError::UnknownType(-9999)));
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(TypeTag::JavaDecimal.to_string(), "JAVA_DECIMAL");
        assert_eq!(TypeTag::NullableInt32Array.to_string(), "NULLABLE_INT32_ARRAY");
    }

    #[test]
    fn test_composites() {
        let composites: Vec<_> = TypeTag::ALL.iter().filter(|t| t.is_composite()).collect();
        assert_eq!(
            composites,
            vec![&TypeTag::Portable, &TypeTag::Compact, &TypeTag::Json]
        );
    }
}
