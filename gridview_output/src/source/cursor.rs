use std::fmt;

use async_trait::async_trait;
use gridview_types::{Column, Row, TypeTag, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{RowSender, StreamedSource, stream_channel};
use crate::OutputError;

/// Declared type of a SQL result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlColumnType {
    /// VARCHAR
    Varchar,
    /// BOOLEAN
    Boolean,
    /// TINYINT
    TinyInt,
    /// SMALLINT
    SmallInt,
    /// INTEGER
    Integer,
    /// BIGINT
    BigInt,
    /// DECIMAL
    Decimal,
    /// REAL
    Real,
    /// DOUBLE
    Double,
    /// DATE
    Date,
    /// TIME
    Time,
    /// TIMESTAMP
    Timestamp,
    /// TIMESTAMP WITH TIME ZONE
    TimestampWithTimeZone,
    /// OBJECT
    Object,
    /// NULL
    Null,
    /// JSON
    Json,
    /// A type this build does not render, by its wire id.
    Other(i32),
}

impl SqlColumnType {
    /// Tag used to render values of this column type.
    #[must_use]
    pub const fn type_tag(self) -> TypeTag {
        match self {
            Self::Varchar => TypeTag::String,
            Self::Boolean => TypeTag::Bool,
            Self::TinyInt => TypeTag::Int8,
            Self::SmallInt => TypeTag::Int16,
            Self::Integer => TypeTag::Int32,
            Self::BigInt => TypeTag::Int64,
            Self::Decimal => TypeTag::JavaDecimal,
            Self::Real => TypeTag::Float32,
            Self::Double => TypeTag::Float64,
            Self::Date => TypeTag::LocalDate,
            Self::Time => TypeTag::LocalTime,
            Self::Timestamp => TypeTag::LocalDateTime,
            Self::TimestampWithTimeZone => TypeTag::OffsetDateTime,
            Self::Object => TypeTag::Skip,
            Self::Null => TypeTag::Nil,
            Self::Json => TypeTag::Json,
            Self::Other(_) => TypeTag::NotDecoded,
        }
    }
}

impl fmt::Display for SqlColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Varchar => f.write_str("VARCHAR"),
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::TinyInt => f.write_str("TINYINT"),
            Self::SmallInt => f.write_str("SMALLINT"),
            Self::Integer => f.write_str("INTEGER"),
            Self::BigInt => f.write_str("BIGINT"),
            Self::Decimal => f.write_str("DECIMAL"),
            Self::Real => f.write_str("REAL"),
            Self::Double => f.write_str("DOUBLE"),
            Self::Date => f.write_str("DATE"),
            Self::Time => f.write_str("TIME"),
            Self::Timestamp => f.write_str("TIMESTAMP"),
            Self::TimestampWithTimeZone => f.write_str("TIMESTAMP_WITH_TIME_ZONE"),
            Self::Object => f.write_str("OBJECT"),
            Self::Null => f.write_str("NULL"),
            Self::Json => f.write_str("JSON"),
            Self::Other(id) => write!(f, "OTHER({id})"),
        }
    }
}

/// Name and type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlColumnMetadata {
    /// Column label.
    pub name: String,
    /// Declared type.
    pub column_type: SqlColumnType,
}

impl SqlColumnMetadata {
    /// Create column metadata.
    pub fn new(name: impl Into<String>, column_type: SqlColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// One row as a cursor returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    /// Metadata, one entry per column.
    pub columns: Vec<SqlColumnMetadata>,
    /// Raw values in column order.
    pub values: Vec<Value>,
}

impl SqlRow {
    /// Tag every value by its declared column type. Missing values become nil.
    #[must_use]
    pub fn into_row(self) -> Row {
        let mut values = self.values.into_iter();
        self.columns
            .into_iter()
            .map(|meta| {
                let value = values.next().unwrap_or(Value::Nil);
                Column::new(meta.name, meta.column_type.type_tag(), value)
            })
            .collect()
    }
}

/// A live SQL result owned by the query layer.
#[async_trait]
pub trait SqlCursor: Send {
    /// Whether another row is available; may wait for the server.
    async fn has_next(&mut self) -> bool;

    /// Fetch the next row.
    ///
    /// # Errors
    ///
    /// Whatever the query layer reports for this row.
    async fn fetch(&mut self) -> Result<SqlRow, OutputError>;
}

/// Pull `cursor` dry into `tx`, stopping when `cancel` fires.
///
/// Returns the number of rows delivered. A cursor failure is forwarded to the
/// consumer and also returned.
///
/// # Errors
///
/// [`OutputError::StreamCancelled`] when cancelled, or the cursor's error.
pub async fn drain_cursor<C: SqlCursor + ?Sized>(
    cursor: &mut C,
    tx: RowSender,
    cancel: CancellationToken,
) -> Result<u64, OutputError> {
    let mut count = 0_u64;
    while cursor.has_next().await {
        let row = match cursor.fetch().await {
            Ok(row) => row.into_row(),
            Err(err) => {
                debug!("cursor failed after {count} rows: {err}");
                // The consumer may already be gone; the caller still gets the error.
                let _ = tx.fail(OutputError::upstream(err.to_string()), &cancel).await;
                return Err(err);
            }
        };
        tx.send(row, &cancel).await?;
        count += 1;
    }
    info!("cursor exhausted after {count} rows");
    Ok(count)
}

/// Run a cursor on its own task and hand back the consuming end.
///
/// The channel closes when the task finishes, so the returned source ends
/// after the last row. The join handle yields the number of rows delivered.
pub fn stream_cursor<C>(
    mut cursor: C,
    capacity: usize,
    cancel: CancellationToken,
) -> (StreamedSource, JoinHandle<Result<u64, OutputError>>)
where
    C: SqlCursor + 'static,
{
    let (tx, source) = stream_channel(capacity);
    let handle = tokio::spawn(async move { drain_cursor(&mut cursor, tx, cancel).await });
    (source, handle)
}
