use std::{cmp::Ordering, fmt};

/// Physical type declared for a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Signed 64-bit integer.
    Int64,
    /// UTF-8 byte sequence.
    Utf8,
}

impl DataType {
    /// Returns a textual representation of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int64 => "int64",
            DataType::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal values accepted by predicates, stored in records and statistics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarValue {
    /// Absence marker; only valid for optional columns.
    Null,
    /// Signed 64-bit integer.
    Int64(i64),
    /// UTF-8 string.
    Utf8(String),
}

impl ScalarValue {
    /// Represents an absent value.
    #[must_use]
    pub const fn null() -> Self {
        ScalarValue::Null
    }

    /// Returns true when the value is the absence marker.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Type of the value, or `None` for `Null`.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Int64(_) => Some(DataType::Int64),
            ScalarValue::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// Compares this scalar with another, returning the ordering when both sides are comparable.
    ///
    /// `Null` and values of different types are never comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ScalarValue::Int64(lhs), ScalarValue::Int64(rhs)) => Some(lhs.cmp(rhs)),
            (ScalarValue::Utf8(lhs), ScalarValue::Utf8(rhs)) => Some(lhs.cmp(rhs)),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int64(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            ScalarValue::Utf8(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("null"),
            ScalarValue::Int64(value) => write!(f, "{value}"),
            ScalarValue::Utf8(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_owned())
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}

/// Rust types that can back a column, used to type user-defined predicates.
pub trait ColumnValue: Ord + fmt::Debug + Send + Sync + 'static {
    /// Column type that stores values of this Rust type.
    const DATA_TYPE: DataType;

    /// Borrows the typed payload of a scalar, or `None` when the scalar holds
    /// another type or `Null`.
    fn from_scalar(value: &ScalarValue) -> Option<&Self>;
}

impl ColumnValue for i64 {
    const DATA_TYPE: DataType = DataType::Int64;

    fn from_scalar(value: &ScalarValue) -> Option<&Self> {
        match value {
            ScalarValue::Int64(value) => Some(value),
            _ => None,
        }
    }
}

impl ColumnValue for str {
    const DATA_TYPE: DataType = DataType::Utf8;

    fn from_scalar(value: &ScalarValue) -> Option<&Self> {
        match value {
            ScalarValue::Utf8(value) => Some(value.as_str()),
            _ => None,
        }
    }
}
